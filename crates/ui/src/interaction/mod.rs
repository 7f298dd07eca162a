//! Transient interaction state around the composer: focus-on-ready, Enter
//! dispatch with send gating, and the copy confirmation indicator.

mod copy;
mod focus;
mod keys;

pub use copy::CopyConfirmation;
pub use focus::{Focus, FocusOnReady, FocusTarget, PaneFocus};
pub use keys::{KeyOutcome, dispatch_key, send_gate};
