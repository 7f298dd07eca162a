use crate::transcript::EntryId;

use thiserror::Error;

/// Result type alias for murmur-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the murmur transcript view
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Transcript store errors
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Errors raised by transcript store writers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No entry carries the given id
    #[error("entry not found: {0}")]
    EntryNotFound(EntryId),
}
