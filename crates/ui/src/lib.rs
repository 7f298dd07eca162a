pub mod app;
pub mod clipboard;
pub mod components;
pub mod event_handler;
pub mod interaction;
pub mod layout;
pub mod markdown;
pub mod state;
pub mod sync;
pub mod syntax;
pub mod theme;
pub mod transcript;
pub mod view;

pub use app::App;
pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use event_handler::{EventHandler, KeyAction, TerminalEvents};
pub use interaction::{CopyConfirmation, FocusTarget, send_gate};
pub use markdown::{CodeStyle, CodeStylePolicy, MarkdownRenderer};
pub use state::InputState;
pub use sync::{AutoscrollPolicy, ChangeDetector, ChangeReport, ScrollController, Snapshot, TerminalViewport, Viewport};
pub use theme::Theme;
pub use transcript::{RenderOptions, RenderedTranscript, TranscriptRenderer};
pub use view::TranscriptView;
