//! UI module for the chatbot TUI.

pub mod layout;
pub mod theme;
pub mod widgets;

pub use layout::*;
