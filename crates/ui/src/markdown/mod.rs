//! Markdown bodies rendered into terminal lines.

mod policy;
mod render;
mod wrap;

pub use policy::{CodeLayout, CodeStyle, CodeStylePolicy, fence_class, language_from_class};
pub use render::MarkdownRenderer;
pub use wrap::{Fragment, pad_to, spans_width, wrap_chars, wrap_fragments};
