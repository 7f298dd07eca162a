//! Keeps the transcript viewport pinned to new content.
//!
//! Every evaluation pass feeds the latest store snapshot to a
//! [`ChangeDetector`]; its [`ChangeReport`] tells the [`ScrollController`]
//! whether to jump to the bottom. Neither piece reads the store directly.

mod change;
mod scroll;

pub use change::{ChangeDetector, ChangeReport, Snapshot};
pub use scroll::{AutoscrollPolicy, ScrollController, TerminalViewport, Viewport};
