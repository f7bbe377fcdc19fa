//! Reusable widgets for the chatbot TUI.

pub mod model_selector;
pub mod status_bar;
pub mod text_input;
pub mod transcript;

pub use model_selector::ModelSelector;
pub use status_bar::{KeyHint, StatusBar};
pub use text_input::TextInputState;
pub use transcript::{message_lines, Transcript};
