mod renderer;

pub use renderer::{RenderOptions, RenderedTranscript, TranscriptRenderer};
