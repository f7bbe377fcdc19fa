//! Layout helpers for the chatbot TUI.

use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Height of the input box, borders included.
pub const INPUT_HEIGHT: u16 = 3;

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Areas of the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    /// Model selector row.
    pub header: Rect,
    /// Bordered transcript pane.
    pub transcript: Rect,
    /// Bordered input box.
    pub input: Rect,
    /// Status bar row.
    pub status: Rect,
}

/// Split the screen into header, transcript, input, and status bar.
pub fn chat_layout(area: Rect) -> ChatLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    ChatLayout {
        header: chunks[0],
        transcript: chunks[1],
        input: chunks[2],
        status: chunks[3],
    }
}

/// Text area inside the transcript border.
pub fn transcript_viewport(area: Rect) -> Rect {
    chat_layout(area).transcript.inner(Margin::new(1, 1))
}
