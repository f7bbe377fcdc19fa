//! Screens and the help overlay drawn over them.

pub mod chat;

use crate::app::App;
use crate::ui::centered_fixed;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Key bindings listed in the help overlay.
const HELP_KEYS: &[(&str, &str)] = &[
    ("Enter", "Send message"),
    ("Tab / Shift+Tab", "Next/prev model"),
    ("Up / Down", "Recall sent messages"),
    ("PgUp / PgDn", "Scroll conversation"),
    ("Ctrl+L", "Clear conversation"),
    ("Esc / Ctrl+C", "Quit"),
    ("F1", "Toggle this help"),
];

const HELP_KEY_COLUMN: usize = 18;

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = vec![Line::default()];
    lines.extend(HELP_KEYS.iter().map(|(key, what)| {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{key:<HELP_KEY_COLUMN$}"), Styles::highlight()),
            Span::raw(*what),
        ])
    }));
    lines.push(Line::default());
    lines.push(Line::styled("  [Press any key to close]", Styles::dim()));
    lines
}

/// Draw the key binding overlay centered in `area`.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let height = u16::try_from(HELP_KEYS.len() + 5).unwrap_or(u16::MAX);
    let overlay = centered_fixed(
        50.min(area.width.saturating_sub(4)),
        height.min(area.height.saturating_sub(4)),
        area,
    );
    Clear.render(overlay, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .title(" Help ")
        .title_style(Styles::title());

    Paragraph::new(help_lines())
        .style(Styles::default())
        .block(block)
        .render(overlay, buf);
}
