//! Transcript view: the chat pane, the composer and their shared state
//!
//! Every draw runs one evaluation pass in a fixed order: lay out the frame,
//! measure (or mount) the viewport, compare the store's snapshot against the
//! previous one and autoscroll, apply focus-on-ready, then paint.

use crate::clipboard::{Clipboard, ClipboardError};
use crate::components::{Composer, Footer, SendButton, TranscriptPane};
use crate::event_handler::{EventHandler, KeyAction};
use crate::interaction::{CopyConfirmation, FocusOnReady, FocusTarget, PaneFocus, send_gate};
use crate::layout::{SEND_BUTTON_WIDTH, TuiLayout};
use crate::state::InputState;
use crate::sync::{AutoscrollPolicy, ChangeDetector, ChangeReport, ScrollController, Snapshot, TerminalViewport};
use crate::theme::Theme;
use crate::transcript::{RenderedTranscript, TranscriptRenderer};

use crossterm::event::KeyEvent;
use murmur_core::{EntryId, StoreError, TranscriptStore, UiConfig};
use ratatui::{Frame, layout::Rect, widgets::Block};
use std::time::{Duration, Instant};

pub struct TranscriptView<S: TranscriptStore> {
    store: S,
    renderer: TranscriptRenderer,
    detector: ChangeDetector,
    scroll: ScrollController<TerminalViewport>,
    /// Layout of `rendered_snapshot` at `rendered.width`
    rendered: RenderedTranscript,
    rendered_snapshot: Option<Snapshot>,
    layout: Option<TuiLayout>,
    input: InputState,
    can_send: bool,
    focus: PaneFocus,
    focus_on_ready: FocusOnReady,
    copy: CopyConfirmation,
}

impl<S: TranscriptStore> TranscriptView<S> {
    pub fn new(store: S, config: &UiConfig) -> Self {
        Self::with_renderer(store, config, TranscriptRenderer::from_config(config))
    }

    pub fn with_renderer(store: S, config: &UiConfig, renderer: TranscriptRenderer) -> Self {
        Self {
            store,
            renderer,
            detector: ChangeDetector::new(),
            scroll: ScrollController::new(AutoscrollPolicy::from(config)),
            rendered: RenderedTranscript::default(),
            rendered_snapshot: None,
            layout: None,
            input: InputState::new(),
            can_send: false,
            focus: PaneFocus::default(),
            focus_on_ready: FocusOnReady::new(),
            copy: CopyConfirmation::new(Duration::from_millis(config.copy_confirmation_ms)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one evaluation pass for a frame of `area`
    pub fn sync(&mut self, area: Rect) -> ChangeReport {
        let text_width = Composer::text_width(area.width.saturating_sub(SEND_BUTTON_WIDTH));
        let (input_rows, _) = self.input.layout(text_width);
        let layout = TuiLayout::calculate(area, input_rows.len());
        let content = TranscriptPane::content_area(layout.transcript);
        self.layout = Some(layout);

        let snapshot = Snapshot::new(self.store.entries());
        let width = content.width as usize;
        if self.rendered.width != width || self.rendered_snapshot.as_ref() != Some(&snapshot) {
            self.rendered = self.renderer.render(snapshot.entries(), width);
            self.rendered_snapshot = Some(snapshot.clone());
        }

        let height = content.height as usize;
        match self.scroll.viewport_mut() {
            Some(viewport) => viewport.measure(self.rendered.height(), height),
            None if height > 0 => {
                self.scroll.mount(TerminalViewport::new(self.rendered.height(), height));
            }
            None => {}
        }

        let report = self.detector.observe(snapshot);
        self.scroll.apply(&report);
        self.focus_on_ready.observe(self.can_send, &mut self.focus);
        report
    }

    /// Evaluate and paint the whole frame
    pub fn draw(&mut self, frame: &mut Frame<'_>, now: Instant) -> ChangeReport {
        let area = frame.area();
        let report = self.sync(area);
        let Some(layout) = self.layout else {
            return report;
        };

        frame.render_widget(Block::default().style(Theme::base()), area);

        let offset = self.scroll.offset().unwrap_or(0);
        let focus = self.focus.current();
        TranscriptPane::new(&self.rendered, offset, focus == FocusTarget::Transcript).render(frame, layout.transcript);
        Composer::new(&self.input, focus == FocusTarget::Input).render(frame, layout.composer);
        SendButton::new(self.is_send_enabled()).render(frame, layout.send_button);
        Footer::new(layout.mode, focus, self.copy.is_active(now), self.can_send).render(frame, layout.footer);
        report
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn input_text(&self) -> &str {
        self.input.text()
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input.set_text(text);
    }

    pub fn can_send(&self) -> bool {
        self.can_send
    }

    /// Update transport readiness; a false to true change focuses the composer
    pub fn set_can_send(&mut self, can_send: bool) {
        self.can_send = can_send;
        self.focus_on_ready.observe(can_send, &mut self.focus);
    }

    pub fn is_send_enabled(&self) -> bool {
        send_gate(self.can_send, self.input.text())
    }

    /// Take the composer text if sending is allowed
    pub fn send(&mut self) -> Option<String> {
        if !self.is_send_enabled() {
            return None;
        }

        let message = self.input.take();
        self.input.add_to_history(message.clone());
        tracing::debug!(chars = message.chars().count(), "message sent");
        Some(message)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<KeyAction> {
        EventHandler::handle_key_event(key, self)
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus.current()
    }

    pub fn toggle_focus(&mut self) {
        self.focus.toggle();
    }

    pub fn scroll(&self) -> &ScrollController<TerminalViewport> {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollController<TerminalViewport> {
        &mut self.scroll
    }

    pub fn rendered(&self) -> &RenderedTranscript {
        &self.rendered
    }

    /// Plain text of the mounted transcript viewport
    pub fn copy_text(&self) -> Option<String> {
        self.scroll.is_mounted().then(|| self.rendered.plain_text.clone())
    }

    /// Copy the transcript through `clipboard`, blocking on the write
    pub fn copy_transcript(&mut self, clipboard: &dyn Clipboard, now: Instant) -> bool {
        let Some(text) = self.copy_text() else {
            tracing::trace!("copy skipped, no viewport mounted");
            return false;
        };
        let result = clipboard.write_text(&text);
        self.copy.resolve(result, now)
    }

    /// Apply a clipboard write that finished elsewhere
    pub fn finish_copy(&mut self, result: Result<(), ClipboardError>, now: Instant) -> bool {
        self.copy.resolve(result, now)
    }

    pub fn is_copy_confirmed(&self, now: Instant) -> bool {
        self.copy.is_active(now)
    }

    /// Expire the copy indicator; returns true when a redraw is needed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.copy.expire(now)
    }

    pub fn toggle_expand(&self, id: &EntryId) -> Result<(), StoreError> {
        self.store.toggle_expand(id)
    }

    /// Toggle the newest visible entry, returning its id
    pub fn toggle_latest(&self) -> Option<EntryId> {
        let id = self.store.entries().into_iter().rev().find(|e| !e.is_hidden)?.id;
        match self.toggle_expand(&id) {
            Ok(()) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, id = %id, "failed to toggle entry");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptRenderer;

    use murmur_core::{Entry, SharedTranscript};
    use std::sync::Mutex;

    struct MemoryClipboard(Mutex<Vec<String>>);

    impl Clipboard for MemoryClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("headless".to_string()))
        }
    }

    fn view(store: SharedTranscript) -> TranscriptView<SharedTranscript> {
        TranscriptView::with_renderer(store, &UiConfig::default(), TranscriptRenderer::default())
    }

    fn area() -> Rect {
        Rect::new(0, 0, 60, 20)
    }

    #[test]
    fn test_first_pass_mounts_at_bottom() {
        let store = SharedTranscript::with_entries((0..20).map(|i| Entry::assistant(format!("line {i}"))));
        let mut view = view(store);

        view.sync(area());
        assert!(view.scroll().is_mounted());
        assert!(view.scroll().is_at_bottom());
    }

    #[test]
    fn test_growth_scrolls_back_to_bottom() {
        let store = SharedTranscript::with_entries((0..20).map(|i| Entry::assistant(format!("line {i}"))));
        let mut view = view(store.clone());
        view.sync(area());

        view.scroll_mut().scroll_to_top();
        assert!(!view.sync(area()).should_scroll());
        assert_eq!(view.scroll().offset(), Some(0));

        store.push(Entry::user("more"));
        assert!(view.sync(area()).grew);
        assert!(view.scroll().is_at_bottom());
    }

    #[test]
    fn test_streamed_update_scrolls() {
        let store = SharedTranscript::with_entries((0..20).map(|i| Entry::assistant(format!("line {i}"))));
        let id = store.push(Entry::assistant("partial"));
        let mut view = view(store.clone());
        view.sync(area());
        view.scroll_mut().scroll_up(5);

        store.append_to(&id, " answer").unwrap();
        let report = view.sync(area());
        assert!(report.updated && !report.grew);
        assert!(view.scroll().is_at_bottom());
    }

    #[test]
    fn test_send_is_gated() {
        let mut view = view(SharedTranscript::new());
        view.set_input_text("hello");
        assert_eq!(view.send(), None);

        view.set_can_send(true);
        view.set_input_text("   ");
        assert_eq!(view.send(), None);

        view.set_input_text("hello");
        assert_eq!(view.send().as_deref(), Some("hello"));
        assert_eq!(view.input_text(), "");
        assert_eq!(view.input().message_history, vec!["hello".to_string()]);
    }

    #[test]
    fn test_focus_on_ready_fires_once() {
        let mut view = view(SharedTranscript::new());
        view.toggle_focus();
        assert_eq!(view.focus(), FocusTarget::Transcript);

        view.set_can_send(true);
        assert_eq!(view.focus(), FocusTarget::Input);

        view.toggle_focus();
        view.sync(area());
        view.set_can_send(true);
        assert_eq!(view.focus(), FocusTarget::Transcript);
    }

    #[test]
    fn test_copy_needs_mounted_viewport() {
        let clipboard = MemoryClipboard(Mutex::new(Vec::new()));
        let mut view = view(SharedTranscript::with_entries([Entry::user("hi")]));
        let now = Instant::now();

        assert!(!view.copy_transcript(&clipboard, now));
        assert!(clipboard.0.lock().unwrap().is_empty());

        view.sync(area());
        assert!(view.copy_transcript(&clipboard, now));
        assert_eq!(clipboard.0.lock().unwrap().as_slice(), ["hi".to_string()]);
        assert!(view.is_copy_confirmed(now));
    }

    #[test]
    fn test_copy_window_expires() {
        let clipboard = MemoryClipboard(Mutex::new(Vec::new()));
        let mut view = view(SharedTranscript::with_entries([Entry::user("hi")]));
        view.sync(area());
        let start = Instant::now();

        view.copy_transcript(&clipboard, start);
        assert!(!view.tick(start + Duration::from_millis(1499)));
        assert!(view.tick(start + Duration::from_millis(1500)));
        assert!(!view.is_copy_confirmed(start + Duration::from_millis(1500)));
    }

    #[test]
    fn test_failed_copy_leaves_indicator_off() {
        let mut view = view(SharedTranscript::with_entries([Entry::user("hi")]));
        view.sync(area());
        let now = Instant::now();

        assert!(!view.copy_transcript(&BrokenClipboard, now));
        assert!(!view.is_copy_confirmed(now));
    }

    #[test]
    fn test_toggle_latest_skips_hidden() {
        let store = SharedTranscript::new();
        let shown = store.push(Entry::assistant("shown"));
        store.push(Entry::assistant("internal").hidden());
        let view = view(store.clone());

        assert_eq!(view.toggle_latest(), Some(shown.clone()));
        let entries = store.entries();
        assert!(entries[0].expanded);
        assert!(!entries[1].expanded);
    }

    #[test]
    fn test_toggle_on_empty_store() {
        let view = view(SharedTranscript::new());
        assert_eq!(view.toggle_latest(), None);
    }
}
