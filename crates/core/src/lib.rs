pub mod config;
pub mod error;
pub mod logging;
pub mod transcript;

pub use config::{AutoscrollMode, Config, ConfigError, DEFAULT_COPY_CONFIRMATION_MS, UiConfig};
pub use error::{Error, Result, StoreError};
pub use transcript::{Entry, EntryId, Role, SharedTranscript, TranscriptStore};
