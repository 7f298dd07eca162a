mod event_loop;

use crate::clipboard::{Clipboard, ClipboardError};
use crate::event_handler::KeyAction;
use crate::view::TranscriptView;

use crossterm::event::Event;
use murmur_core::{Entry, SharedTranscript, UiConfig};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};

pub use event_loop::run;

/// Main TUI application
///
/// Owns the transcript view and the channels tying it to the rest of the
/// process: store revisions in, transport readiness in, sent messages out,
/// clipboard results back from blocking tasks.
pub struct App {
    view: TranscriptView<SharedTranscript>,
    clipboard: Arc<dyn Clipboard>,
    copy_tx: mpsc::UnboundedSender<std::result::Result<(), ClipboardError>>,
    copy_rx: Option<mpsc::UnboundedReceiver<std::result::Result<(), ClipboardError>>>,
    revision_rx: Option<watch::Receiver<u64>>,
    ready_rx: Option<watch::Receiver<bool>>,
    outbox: Option<mpsc::UnboundedSender<String>>,
    should_exit: bool,
}

impl App {
    pub fn new(store: SharedTranscript, config: &UiConfig, clipboard: Arc<dyn Clipboard>) -> Self {
        let (copy_tx, copy_rx) = mpsc::unbounded_channel();
        let revision_rx = Some(store.subscribe());
        Self {
            view: TranscriptView::new(store, config),
            clipboard,
            copy_tx,
            copy_rx: Some(copy_rx),
            revision_rx,
            ready_rx: None,
            outbox: None,
            should_exit: false,
        }
    }

    /// Follow transport readiness from `rx`, starting from its current value
    pub fn with_readiness(mut self, rx: watch::Receiver<bool>) -> Self {
        self.view.set_can_send(*rx.borrow());
        self.ready_rx = Some(rx);
        self
    }

    /// Forward sent messages to `tx`
    pub fn with_outbox(mut self, tx: mpsc::UnboundedSender<String>) -> Self {
        self.outbox = Some(tx);
        self
    }

    pub fn view(&self) -> &TranscriptView<SharedTranscript> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TranscriptView<SharedTranscript> {
        &mut self.view
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    /// Handle one terminal event; returns whether a redraw is needed
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => {
                if let Some(action) = self.view.handle_key(key) {
                    self.handle_action(action);
                }
                true
            }
            Event::Paste(text) => {
                self.view.input_mut().insert_str(&text);
                true
            }
            Event::Resize(..) => true,
            _ => false,
        }
    }

    pub fn handle_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::SendMessage { message } => self.submit(message),
            KeyAction::CopyTranscript { text } => self.start_copy(text),
            KeyAction::ToggleExpand { id } => tracing::debug!(id = %id, "toggled entry"),
            KeyAction::Quit => {
                tracing::info!("exit requested");
                self.should_exit = true;
            }
        }
    }

    /// Record the user's message and hand it to the responder
    fn submit(&mut self, message: String) {
        self.view.store().push(Entry::user(message.clone()));
        match &self.outbox {
            Some(tx) => {
                if tx.send(message).is_err() {
                    tracing::warn!("responder is gone, message not delivered");
                    self.outbox = None;
                }
            }
            None => tracing::debug!("no responder attached"),
        }
    }

    /// Write `text` to the clipboard off the UI task
    fn start_copy(&self, text: String) {
        let clipboard = Arc::clone(&self.clipboard);
        let tx = self.copy_tx.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(clipboard.write_text(&text));
        });
    }

    pub fn finish_copy(&mut self, result: std::result::Result<(), ClipboardError>, now: Instant) -> bool {
        self.view.finish_copy(result, now)
    }

    /// Expire timed state; returns whether a redraw is needed
    pub fn tick(&mut self, now: Instant) -> bool {
        self.view.tick(now)
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        self.view.draw(frame, Instant::now());
    }

    pub fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        terminal.draw(|frame| self.render(frame))?;
        Ok(())
    }
}
