//! Chat screen: model selector, transcript, input box and status bar.

use crate::app::App;
use crate::screens::Screen;
use crate::ui::chat_layout;
use crate::ui::theme::{spinner_frame, Styles};
use crate::ui::widgets::{KeyHint, ModelSelector, StatusBar, Transcript};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Widget},
};

/// Placeholder shown in the empty input box.
pub const INPUT_PLACEHOLDER: &str = "Type a message...";

/// The chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let layout = chat_layout(area);

        ModelSelector::new(app.model()).render(layout.header, buf);

        let mut block = Block::default()
            .title(" Chatbot ")
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(Styles::border())
            .style(Styles::default());
        if app.transcript_scroll > 0 {
            let hint = Line::styled(" PgDn: latest ", Styles::dim()).right_aligned();
            block = block.title_bottom(hint);
        }
        Transcript::new(app.session.messages())
            .scroll_back(app.transcript_scroll)
            .block(block)
            .render(layout.transcript, buf);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_active())
            .style(Styles::default());
        app.input_state
            .widget()
            .block(input_block)
            .focused(!app.show_help)
            .placeholder(INPUT_PLACEHOLDER)
            .render(layout.input, buf);

        let right = status_text(app);
        let right_style = if app.is_waiting() {
            Styles::warning()
        } else {
            Styles::dim()
        };
        StatusBar::new("Chat")
            .hints(vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("Tab", "Model"),
                KeyHint::new("^L", "Clear"),
                KeyHint::new("F1", "Help"),
                KeyHint::new("Esc", "Quit"),
            ])
            .right(&right)
            .right_style(right_style)
            .render(layout.status, buf);
    }
}

/// Right-hand status: waiting indicator or the message count.
fn status_text(app: &App) -> String {
    let pending = app.session.pending();
    if pending > 0 {
        format!("{} waiting ({pending})", spinner_frame(app.tick))
    } else {
        match app.session.messages().len() {
            1 => "1 message".to_string(),
            n => format!("{n} messages"),
        }
    }
}
