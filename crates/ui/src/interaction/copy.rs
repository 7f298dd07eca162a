use crate::clipboard::ClipboardError;
use murmur_core::DEFAULT_COPY_CONFIRMATION_MS;
use std::time::{Duration, Instant};

/// "Copied!" indicator with a single replaceable deadline
///
/// Each successful copy sets the deadline to `now + window`, replacing any
/// earlier one, so a stale reset can never clear a newer confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyConfirmation {
    window: Duration,
    deadline: Option<Instant>,
}

impl CopyConfirmation {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Start or restart the window
    pub fn confirm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Active until the full window has elapsed
    pub fn is_active(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Clear an elapsed deadline; returns true if the indicator just turned off
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Apply the result of a clipboard write
    ///
    /// Failures are logged and leave the indicator as it was.
    pub fn resolve(&mut self, result: Result<(), ClipboardError>, now: Instant) -> bool {
        match result {
            Ok(()) => {
                self.confirm(now);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to copy transcript");
                false
            }
        }
    }
}

impl Default for CopyConfirmation {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_COPY_CONFIRMATION_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_inactive_by_default() {
        let copy = CopyConfirmation::default();
        assert_eq!(copy.window(), ms(1500));
        assert!(!copy.is_active(Instant::now()));
    }

    #[test]
    fn test_success_window() {
        let start = Instant::now();
        let mut copy = CopyConfirmation::default();

        assert!(copy.resolve(Ok(()), start));
        assert!(copy.is_active(start));
        assert!(copy.is_active(start + ms(1499)));
        assert!(!copy.is_active(start + ms(1500)));
    }

    #[test]
    fn test_second_copy_restarts_window() {
        let start = Instant::now();
        let mut copy = CopyConfirmation::default();

        copy.resolve(Ok(()), start);
        copy.resolve(Ok(()), start + ms(500));

        assert!(copy.is_active(start + ms(1600)));
        assert!(!copy.expire(start + ms(1600)));
        assert!(copy.is_active(start + ms(1999)));
        assert!(!copy.is_active(start + ms(2000)));
        assert!(copy.expire(start + ms(2000)));
    }

    #[test]
    fn test_failure_leaves_indicator_off() {
        let now = Instant::now();
        let mut copy = CopyConfirmation::default();

        assert!(!copy.resolve(Err(ClipboardError::Unavailable("headless".into())), now));
        assert!(!copy.is_active(now));
    }

    #[test]
    fn test_failure_does_not_cancel_active_window() {
        let now = Instant::now();
        let mut copy = CopyConfirmation::default();

        copy.resolve(Ok(()), now);
        copy.resolve(Err(ClipboardError::Write("busy".into())), now + ms(100));
        assert!(copy.is_active(now + ms(1000)));
    }

    #[test]
    fn test_expire_only_once() {
        let now = Instant::now();
        let mut copy = CopyConfirmation::new(ms(10));

        copy.confirm(now);
        assert!(copy.expire(now + ms(10)));
        assert!(!copy.expire(now + ms(20)));
    }
}
