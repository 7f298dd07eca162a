use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Whether the send action is available
///
/// Requires transport readiness and some non-whitespace text.
pub fn send_gate(can_send: bool, text: &str) -> bool {
    can_send && !text.trim().is_empty()
}

/// What the composer should do with a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Skip the key's ordinary editing effect
    pub suppress_default: bool,
    /// Invoke the send action
    pub send: bool,
}

impl KeyOutcome {
    /// Let the key through untouched
    pub const DEFAULT: KeyOutcome = KeyOutcome { suppress_default: false, send: false };
}

/// Enter without Shift sends (when `gate` allows) and never inserts a newline.
/// Shift+Enter and every other key keep their default effect.
pub fn dispatch_key(key: &KeyEvent, gate: bool) -> KeyOutcome {
    if key.kind != KeyEventKind::Press {
        return KeyOutcome::DEFAULT;
    }

    match key.code {
        KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => {
            KeyOutcome { suppress_default: true, send: gate }
        }
        _ => KeyOutcome::DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_send_gate_truth_table() {
        assert!(!send_gate(false, "hello"));
        assert!(!send_gate(true, ""));
        assert!(!send_gate(true, "  "));
        assert!(!send_gate(true, "\n\t"));
        assert!(send_gate(true, "hi"));
    }

    #[test]
    fn test_enter_sends_when_gate_open() {
        let outcome = dispatch_key(&key(KeyCode::Enter, KeyModifiers::NONE), true);
        assert_eq!(outcome, KeyOutcome { suppress_default: true, send: true });
    }

    #[test]
    fn test_enter_with_closed_gate_still_suppresses_newline() {
        let outcome = dispatch_key(&key(KeyCode::Enter, KeyModifiers::NONE), false);
        assert!(outcome.suppress_default);
        assert!(!outcome.send);
    }

    #[test]
    fn test_shift_enter_is_default() {
        let outcome = dispatch_key(&key(KeyCode::Enter, KeyModifiers::SHIFT), true);
        assert_eq!(outcome, KeyOutcome::DEFAULT);
    }

    #[test]
    fn test_other_keys_are_default() {
        assert_eq!(dispatch_key(&key(KeyCode::Char('a'), KeyModifiers::NONE), true), KeyOutcome::DEFAULT);
        assert_eq!(dispatch_key(&key(KeyCode::Tab, KeyModifiers::NONE), true), KeyOutcome::DEFAULT);
    }

    #[test]
    fn test_release_events_ignored() {
        let mut event = key(KeyCode::Enter, KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(dispatch_key(&event, true), KeyOutcome::DEFAULT);
    }
}
