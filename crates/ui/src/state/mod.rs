mod input;

pub use input::InputState;
