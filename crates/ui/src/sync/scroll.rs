use super::ChangeReport;
use murmur_core::{AutoscrollMode, UiConfig};

/// Scrollable region measured in rows
pub trait Viewport {
    /// Total height of the content
    fn scroll_height(&self) -> usize;

    /// Visible height
    fn viewport_height(&self) -> usize;

    fn scroll_offset(&self) -> usize;

    fn set_scroll_offset(&mut self, offset: usize);

    /// Largest offset that still fills the viewport, 0 for short content
    fn max_scroll_offset(&self) -> usize {
        self.scroll_height().saturating_sub(self.viewport_height())
    }

    /// Rows between the bottom of the viewport and the end of the content
    fn distance_from_bottom(&self) -> usize {
        self.max_scroll_offset().saturating_sub(self.scroll_offset())
    }
}

/// When a reported change is allowed to move the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoscrollPolicy {
    /// Every growth or update jumps to the bottom, even after the reader scrolled up
    #[default]
    Always,
    /// Jump only if the previous pass ended within `threshold` rows of the bottom
    NearBottom { threshold: usize },
}

impl AutoscrollPolicy {
    fn permits(&self, last_distance: Option<usize>) -> bool {
        match self {
            AutoscrollPolicy::Always => true,
            AutoscrollPolicy::NearBottom { threshold } => last_distance.is_none_or(|d| d <= *threshold),
        }
    }
}

impl From<&UiConfig> for AutoscrollPolicy {
    fn from(config: &UiConfig) -> Self {
        match config.autoscroll {
            AutoscrollMode::Always => AutoscrollPolicy::Always,
            AutoscrollMode::NearBottom => AutoscrollPolicy::NearBottom { threshold: config.near_bottom_threshold },
        }
    }
}

/// Owns the viewport and moves it in response to change reports
///
/// Every operation checks that a viewport is mounted first; without one it is
/// a no-op.
#[derive(Debug)]
pub struct ScrollController<V: Viewport> {
    viewport: Option<V>,
    policy: AutoscrollPolicy,
    /// Distance from bottom at the end of the previous pass or manual scroll
    last_distance: Option<usize>,
}

impl<V: Viewport> ScrollController<V> {
    pub fn new(policy: AutoscrollPolicy) -> Self {
        Self { viewport: None, policy, last_distance: None }
    }

    pub fn policy(&self) -> AutoscrollPolicy {
        self.policy
    }

    pub fn is_mounted(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn viewport(&self) -> Option<&V> {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> Option<&mut V> {
        self.viewport.as_mut()
    }

    /// Install a new viewport and settle it at the bottom
    ///
    /// The settle runs regardless of policy. Returns false when the viewport
    /// was already mounted, in which case nothing moves.
    pub fn mount(&mut self, viewport: V) -> bool {
        if self.viewport.is_some() {
            return false;
        }

        self.viewport = Some(viewport);
        self.scroll_to_bottom();
        tracing::debug!(distance = ?self.last_distance, "viewport mounted");
        true
    }

    pub fn unmount(&mut self) -> Option<V> {
        self.last_distance = None;
        self.viewport.take()
    }

    /// Set the offset to `max(scroll_height - viewport_height, 0)`
    ///
    /// Idempotent. Returns whether a viewport was there to move.
    pub fn scroll_to_bottom(&mut self) -> bool {
        let Some(viewport) = self.viewport.as_mut() else {
            tracing::trace!("scroll to bottom skipped, no viewport mounted");
            return false;
        };

        let bottom = viewport.max_scroll_offset();
        viewport.set_scroll_offset(bottom);
        self.remember_distance();
        true
    }

    /// Act on one pass's change report
    ///
    /// Scrolls only when the report asks for it and the policy agrees.
    /// Returns whether the viewport moved to the bottom.
    pub fn apply(&mut self, report: &ChangeReport) -> bool {
        let scrolled = report.should_scroll() && self.policy.permits(self.last_distance) && self.scroll_to_bottom();
        if !scrolled {
            self.remember_distance();
        }
        scrolled
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.move_by(|offset, _| offset.saturating_sub(rows));
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.move_by(|offset, max| offset.saturating_add(rows).min(max));
    }

    pub fn page_up(&mut self) {
        let page = self.page_size();
        self.scroll_up(page);
    }

    pub fn page_down(&mut self) {
        let page = self.page_size();
        self.scroll_down(page);
    }

    pub fn scroll_to_top(&mut self) {
        self.move_by(|_, _| 0);
    }

    /// Current offset, `None` when unmounted
    pub fn offset(&self) -> Option<usize> {
        self.viewport.as_ref().map(|v| v.scroll_offset())
    }

    pub fn is_at_bottom(&self) -> bool {
        self.viewport.as_ref().is_none_or(|v| v.distance_from_bottom() == 0)
    }

    fn move_by(&mut self, f: impl FnOnce(usize, usize) -> usize) {
        if let Some(viewport) = self.viewport.as_mut() {
            let next = f(viewport.scroll_offset(), viewport.max_scroll_offset());
            viewport.set_scroll_offset(next);
            self.remember_distance();
        }
    }

    /// One row of overlap between pages
    fn page_size(&self) -> usize {
        self.viewport.as_ref().map_or(1, |v| v.viewport_height().saturating_sub(1).max(1))
    }

    fn remember_distance(&mut self) {
        self.last_distance = self.viewport.as_ref().map(|v| v.distance_from_bottom());
    }
}

impl<V: Viewport> Default for ScrollController<V> {
    fn default() -> Self {
        Self::new(AutoscrollPolicy::default())
    }
}

/// Viewport over laid-out terminal rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalViewport {
    content_height: usize,
    height: usize,
    offset: usize,
}

impl TerminalViewport {
    pub fn new(content_height: usize, height: usize) -> Self {
        Self { content_height, height, offset: 0 }
    }

    /// Record the latest layout, clamping the offset into range
    pub fn measure(&mut self, content_height: usize, height: usize) {
        self.content_height = content_height;
        self.height = height;
        self.offset = self.offset.min(self.max_scroll_offset());
    }
}

impl Viewport for TerminalViewport {
    fn scroll_height(&self) -> usize {
        self.content_height
    }

    fn viewport_height(&self) -> usize {
        self.height
    }

    fn scroll_offset(&self) -> usize {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: usize) {
        self.offset = offset.min(self.max_scroll_offset());
    }
}
