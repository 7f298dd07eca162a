use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{Stream, StreamExt};
use murmur_core::{EntryId, TranscriptStore};
use std::io;

use crate::interaction::{FocusTarget, dispatch_key};
use crate::view::TranscriptView;

/// Rows moved per arrow key in the transcript pane
const SCROLL_STEP: usize = 1;

/// Async source of terminal events
///
/// Wraps crossterm's [`EventStream`] so the event loop can await input next
/// to its other channels instead of polling on a timer.
pub struct TerminalEvents<S = EventStream> {
    events: S,
}

impl TerminalEvents {
    pub fn new() -> Self {
        Self { events: EventStream::new() }
    }
}

impl Default for TerminalEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Stream<Item = io::Result<Event>> + Unpin> TerminalEvents<S> {
    pub fn from_stream(events: S) -> Self {
        Self { events }
    }

    /// Next event; `Ok(None)` once the input has closed
    pub async fn next(&mut self) -> io::Result<Option<Event>> {
        self.events.next().await.transpose()
    }
}

/// Event handler for the TUI application
pub struct EventHandler;

impl EventHandler {
    /// Handle a keyboard event, returning the action the app should take
    pub fn handle_key_event<S: TranscriptStore>(event: KeyEvent, view: &mut TranscriptView<S>) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match event.code {
            KeyCode::Esc => return Some(KeyAction::Quit),
            KeyCode::Char('c') | KeyCode::Char('C') if ctrl => return Some(KeyAction::Quit),
            KeyCode::Char('y') | KeyCode::Char('Y') if ctrl => {
                return view.copy_text().map(|text| KeyAction::CopyTranscript { text });
            }
            KeyCode::Char('e') | KeyCode::Char('E') if ctrl => {
                return view.toggle_latest().map(|id| KeyAction::ToggleExpand { id });
            }
            KeyCode::Tab | KeyCode::BackTab => {
                view.toggle_focus();
                return None;
            }
            _ => {}
        }

        match view.focus() {
            FocusTarget::Input => Self::handle_input_key(event, view),
            FocusTarget::Transcript => {
                Self::handle_transcript_key(event, view);
                None
            }
        }
    }

    /// Keys while the composer has focus
    fn handle_input_key<S: TranscriptStore>(event: KeyEvent, view: &mut TranscriptView<S>) -> Option<KeyAction> {
        let outcome = dispatch_key(&event, view.is_send_enabled());
        if outcome.send {
            return view.send().map(|message| KeyAction::SendMessage { message });
        }
        if outcome.suppress_default {
            return None;
        }

        let input = view.input_mut();
        match event.code {
            KeyCode::Enter => input.insert_newline(),
            KeyCode::Char(c) if !event.modifiers.contains(KeyModifiers::CONTROL) => {
                input.insert_char(c);
                input.reset_history_navigation();
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            KeyCode::Home => input.move_home(),
            KeyCode::End => input.move_end(),
            KeyCode::Up => input.navigate_up(),
            KeyCode::Down => input.navigate_down(),
            _ => {}
        }
        None
    }

    /// Keys while the transcript pane has focus
    fn handle_transcript_key<S: TranscriptStore>(event: KeyEvent, view: &mut TranscriptView<S>) {
        let scroll = view.scroll_mut();
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => scroll.scroll_up(SCROLL_STEP),
            KeyCode::Down | KeyCode::Char('j') => scroll.scroll_down(SCROLL_STEP),
            KeyCode::PageUp => scroll.page_up(),
            KeyCode::PageDown => scroll.page_down(),
            KeyCode::Home | KeyCode::Char('g') => scroll.scroll_to_top(),
            KeyCode::End | KeyCode::Char('G') => {
                scroll.scroll_to_bottom();
            }
            _ => {}
        }
    }
}

/// Actions that can be triggered by keyboard events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Send the composer text to the responder
    SendMessage { message: String },
    /// Write the transcript's plain text to the clipboard
    CopyTranscript { text: String },
    /// The entry whose expanded flag was toggled
    ToggleExpand { id: EntryId },
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptRenderer;

    use murmur_core::{Entry, SharedTranscript, UiConfig};
    use ratatui::layout::Rect;

    fn create_test_view() -> TranscriptView<SharedTranscript> {
        let store = SharedTranscript::with_entries((0..20).map(|i| Entry::assistant(format!("line {i}"))));
        let mut view = TranscriptView::with_renderer(store, &UiConfig::default(), TranscriptRenderer::default());
        view.set_can_send(true);
        view.sync(Rect::new(0, 0, 60, 20));
        view
    }

    #[tokio::test]
    async fn test_terminal_events_propagate_read_errors() {
        let mut events = TerminalEvents::from_stream(futures::stream::iter([
            Ok(Event::FocusGained),
            Err(io::Error::other("tty closed")),
        ]));

        assert_eq!(events.next().await.unwrap(), Some(Event::FocusGained));
        let err = events.next().await.unwrap_err();
        assert_eq!(err.to_string(), "tty closed");
        assert_eq!(events.next().await.unwrap(), None);
    }

    fn press(view: &mut TranscriptView<SharedTranscript>, code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
        EventHandler::handle_key_event(KeyEvent::new(code, modifiers), view)
    }

    fn type_text(view: &mut TranscriptView<SharedTranscript>, text: &str) {
        for c in text.chars() {
            press(view, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_typing_fills_composer() {
        let mut view = create_test_view();
        type_text(&mut view, "Hello");
        assert_eq!(view.input_text(), "Hello");

        press(&mut view, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(view.input_text(), "Hell");
    }

    #[test]
    fn test_enter_sends() {
        let mut view = create_test_view();
        type_text(&mut view, "hi");

        let action = press(&mut view, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(action, Some(KeyAction::SendMessage { message: "hi".to_string() }));
        assert_eq!(view.input_text(), "");
    }

    #[test]
    fn test_enter_without_gate_does_nothing() {
        let mut view = create_test_view();
        view.set_can_send(false);
        type_text(&mut view, "hi");

        assert_eq!(press(&mut view, KeyCode::Enter, KeyModifiers::NONE), None);
        assert_eq!(view.input_text(), "hi");

        view.set_input_text("");
        assert_eq!(press(&mut view, KeyCode::Enter, KeyModifiers::NONE), None);
        assert_eq!(view.input_text(), "");
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut view = create_test_view();
        type_text(&mut view, "a");
        assert_eq!(press(&mut view, KeyCode::Enter, KeyModifiers::SHIFT), None);
        type_text(&mut view, "b");
        assert_eq!(view.input_text(), "a\nb");
    }

    #[test]
    fn test_release_is_ignored() {
        let mut view = create_test_view();
        let mut event = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(EventHandler::handle_key_event(event, &mut view), None);
        assert_eq!(view.input_text(), "");
    }

    #[test]
    fn test_quit_keys() {
        let mut view = create_test_view();
        assert_eq!(press(&mut view, KeyCode::Esc, KeyModifiers::NONE), Some(KeyAction::Quit));
        assert_eq!(press(&mut view, KeyCode::Char('c'), KeyModifiers::CONTROL), Some(KeyAction::Quit));
    }

    #[test]
    fn test_ctrl_y_copies_plain_text() {
        let mut view = create_test_view();
        let Some(KeyAction::CopyTranscript { text }) = press(&mut view, KeyCode::Char('y'), KeyModifiers::CONTROL)
        else {
            panic!("expected a copy action");
        };
        assert!(text.starts_with("line 0\n\nline 1"));
        assert_eq!(view.input_text(), "");
    }

    #[test]
    fn test_ctrl_e_toggles_latest() {
        let mut view = create_test_view();
        let action = press(&mut view, KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert!(matches!(action, Some(KeyAction::ToggleExpand { .. })));
        assert!(view.store().entries()[19].expanded);
    }

    #[test]
    fn test_tab_switches_focus_and_arrows_scroll() {
        let mut view = create_test_view();
        assert!(view.scroll().is_at_bottom());

        press(&mut view, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(view.focus(), FocusTarget::Transcript);

        let bottom = view.scroll().offset().unwrap();
        press(&mut view, KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(view.scroll().offset(), Some(bottom - 1));

        press(&mut view, KeyCode::Home, KeyModifiers::NONE);
        assert_eq!(view.scroll().offset(), Some(0));

        press(&mut view, KeyCode::End, KeyModifiers::NONE);
        assert!(view.scroll().is_at_bottom());

        type_text(&mut view, "x");
        assert_eq!(view.input_text(), "");
    }

    #[test]
    fn test_history_keys_in_composer() {
        let mut view = create_test_view();
        type_text(&mut view, "first");
        press(&mut view, KeyCode::Enter, KeyModifiers::NONE);

        press(&mut view, KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(view.input_text(), "first");
        press(&mut view, KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(view.input_text(), "");
    }
}
