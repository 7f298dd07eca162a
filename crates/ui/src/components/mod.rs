pub mod composer;
pub mod footer;
pub mod transcript;

pub use composer::{Composer, SendButton};
pub use footer::Footer;
pub use transcript::TranscriptPane;
