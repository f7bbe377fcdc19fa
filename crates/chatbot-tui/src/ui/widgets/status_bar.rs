//! Bottom status bar: mode badge, key hints, right-aligned status.

use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

/// A key and what it does.
#[derive(Debug, Clone, Copy)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: Vec<KeyHint>,
    status: Option<&'a str>,
    status_style: Style,
}

impl<'a> StatusBar<'a> {
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: Vec::new(),
            status: None,
            status_style: Styles::status_bar(),
        }
    }

    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Text pinned to the right edge.
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.status = Some(text);
        self
    }

    /// Foreground style of the right-hand text.
    #[must_use]
    pub fn right_style(mut self, style: Style) -> Self {
        self.status_style = style;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }
        let row = Rect { height: 1, ..area };
        buf.set_style(row, Styles::status_bar());

        let badge = Span::styled(format!(" {} ", self.mode), Styles::mode_badge());
        let hints = self.hints.iter().flat_map(|hint| {
            [
                Span::styled(format!(" {} ", hint.key), Styles::key_hint()),
                Span::styled(format!(" {} ", hint.label), Styles::key_label()),
            ]
        });
        let line: Line<'_> = std::iter::once(badge)
            .chain(std::iter::once(Span::styled(" ", Styles::status_bar())))
            .chain(hints)
            .collect();
        buf.set_line(row.x, row.y, &line, row.width);

        // Drawn last so the status wins over hints that run long
        let Some(text) = self.status else {
            return;
        };
        let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        if width < row.width {
            let x = row.right() - width - 1;
            buf.set_string(x, row.y, text, self.status_style.bg(Palette::STATUS_BG));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_mode_hints_and_status() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("Chat")
            .hints(vec![KeyHint::new("Enter", "Send")])
            .right("waiting")
            .render(area, &mut buf);

        let line = buffer_to_string(&buf);
        assert!(line.starts_with(" Chat "));
        assert!(line.contains(" Enter  Send "));
        assert!(line.ends_with("waiting"));
    }

    #[test]
    fn test_status_too_wide_is_skipped() {
        let area = Rect::new(0, 0, 8, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new("Chat")
            .right("much too long")
            .render(area, &mut buf);
        assert!(!buffer_to_string(&buf).contains("long"));
    }

    #[test]
    fn test_zero_height() {
        let area = Rect::new(0, 0, 40, 0);
        let mut buf = Buffer::empty(area);
        StatusBar::new("Chat").render(area, &mut buf);
    }
}
