use thiserror::Error;

/// Errors from the clipboard capability
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// No clipboard could be opened (headless session, missing display server)
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The clipboard rejected the text
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Host capability that receives copied text
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard through `arboard`
///
/// A fresh handle is opened per write. The call blocks, so the app runs it on
/// a blocking task.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard.set_text(text).map_err(|e| ClipboardError::Write(e.to_string()))?;
        tracing::debug!(bytes = text.len(), "wrote transcript to clipboard");
        Ok(())
    }
}
