//! Conversation transcript with bottom-anchored scrolling.
//!
//! The transcript follows the latest message unless the user has scrolled
//! back. Scroll position is counted in lines up from the bottom, so a value
//! of zero always shows the newest message.

use crate::ui::theme::Styles;
use chatbot_engine::{Message, Sender};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

/// Shown when the conversation is empty.
pub const EMPTY_HINT: &str = "Start a conversation...";

/// Width of the `You: ` / `Bot: ` prefix.
const PREFIX_WIDTH: usize = 5;

/// Build wrapped transcript lines for a pane of `width` columns.
pub fn message_lines(messages: &[Message], width: usize) -> Vec<Line<'static>> {
    let text_width = width.saturating_sub(PREFIX_WIDTH).max(1);
    let mut lines = Vec::new();

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }

        let prefix_style = match message.sender {
            Sender::User => Styles::user(),
            Sender::Bot => Styles::bot(),
        };
        let prefix = format!("{}: ", message.sender.label());

        let mut wrapped: Vec<String> = Vec::new();
        for paragraph in message.text.split('\n') {
            if paragraph.is_empty() {
                wrapped.push(String::new());
            } else {
                wrapped.extend(
                    textwrap::wrap(paragraph, text_width)
                        .into_iter()
                        .map(std::borrow::Cow::into_owned),
                );
            }
        }

        for (j, text) in wrapped.into_iter().enumerate() {
            let lead = if j == 0 {
                Span::styled(prefix.clone(), prefix_style)
            } else {
                Span::raw(" ".repeat(PREFIX_WIDTH))
            };
            lines.push(Line::from(vec![lead, Span::styled(text, Styles::default())]));
        }
    }

    lines
}

/// Transcript widget.
#[derive(Debug, Clone)]
pub struct Transcript<'a> {
    messages: &'a [Message],
    scroll_back: usize,
    block: Option<Block<'a>>,
}

impl<'a> Transcript<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            scroll_back: 0,
            block: None,
        }
    }

    /// Lines scrolled back from the latest message.
    #[must_use]
    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    /// Set the block to wrap the transcript.
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for Transcript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = match &self.block {
            Some(b) => {
                let inner = b.inner(area);
                b.clone().render(area, buf);
                inner
            }
            None => area,
        };

        if area.height < 1 || area.width < 1 {
            return;
        }

        if self.messages.is_empty() {
            Paragraph::new(Line::from(Span::styled(EMPTY_HINT, Styles::dim())))
                .style(Styles::default())
                .render(area, buf);
            return;
        }

        // Leave the rightmost column for the scrollbar
        let mut lines = message_lines(self.messages, (area.width as usize).saturating_sub(1));
        let state = ScrollState::new(lines.len(), area.height as usize, self.scroll_back);

        // Only the visible window goes to the paragraph, so long
        // conversations never need a u16 scroll offset
        let visible: Vec<Line<'static>> = lines
            .drain(state.offset..)
            .take(state.viewport)
            .collect();
        Paragraph::new(visible)
            .style(Styles::default())
            .render(area, buf);

        if state.total > state.viewport {
            let mut scrollbar_state =
                ScrollbarState::new(state.max_offset()).position(state.offset);
            let scrollbar_area = Rect {
                x: area.x + area.width.saturating_sub(1),
                y: area.y,
                width: 1,
                height: area.height,
            };
            Scrollbar::new(ScrollbarOrientation::VerticalRight).render(
                scrollbar_area,
                buf,
                &mut scrollbar_state,
            );
        }
    }
}

/// Scroll position resolved against content and viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub total: usize,
    pub viewport: usize,
    /// First visible line, counted from the top.
    pub offset: usize,
}

impl ScrollState {
    /// Resolve a bottom-relative `scroll_back` into a top offset.
    pub fn new(total: usize, viewport: usize, scroll_back: usize) -> Self {
        let max = total.saturating_sub(viewport);
        Self {
            total,
            viewport,
            offset: max - scroll_back.min(max),
        }
    }

    pub fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}
