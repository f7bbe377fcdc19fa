//! Single-line text input widget and its editing state.

use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Prompt shown in front of the input.
const PROMPT: &str = "> ";

/// One-line view of a [`TextInputState`], built with [`TextInputState::widget`].
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    content: &'a str,
    cursor: usize,
    block: Option<Block<'a>>,
    focused: bool,
    placeholder: Option<&'a str>,
}

impl<'a> TextInput<'a> {
    #[must_use]
    pub fn block(self, block: Block<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    /// Unfocused inputs draw no cursor.
    #[must_use]
    pub fn focused(self, focused: bool) -> Self {
        Self { focused, ..self }
    }

    /// Dim text shown while the input is empty.
    #[must_use]
    pub fn placeholder(self, placeholder: &'a str) -> Self {
        Self {
            placeholder: Some(placeholder),
            ..self
        }
    }
}

impl Widget for TextInput<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.is_empty() {
            return;
        }

        if self.content.is_empty() {
            let mut spans = vec![Span::styled(PROMPT, Styles::active())];
            if self.focused {
                spans.push(Span::styled("_", Styles::active()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(inner, buf);
            return;
        }

        let (before, after) = visible_window(self.content, self.cursor, inner.width);

        let mut spans = vec![
            Span::styled(PROMPT, Styles::active()),
            Span::styled(before, Styles::default()),
        ];
        if self.focused {
            let cursor = if after.is_empty() { "_" } else { "|" };
            spans.push(Span::styled(cursor, Styles::active()));
        }
        spans.push(Span::styled(after, Styles::default()));

        Paragraph::new(Line::from(spans))
            .style(Styles::default())
            .render(inner, buf);
    }
}

/// Split `content` around `cursor` into the text that fits in `width` columns.
///
/// Room is kept for the prompt and the cursor cell. Text left of the cursor
/// wins, so the cursor never scrolls out of view.
fn visible_window(content: &str, cursor: usize, width: u16) -> (String, String) {
    let chars: Vec<char> = content.chars().collect();
    let cursor = cursor.min(chars.len());
    let available = usize::from(width).saturating_sub(PROMPT.len() + 1);
    let mut used = 0;

    let mut start = cursor;
    while start > 0 {
        let w = chars[start - 1].width().unwrap_or(0);
        if used + w > available {
            break;
        }
        used += w;
        start -= 1;
    }

    let mut after = String::new();
    for &c in &chars[cursor..] {
        let w = c.width().unwrap_or(0);
        if used + w > available {
            break;
        }
        used += w;
        after.push(c);
    }

    (chars[start..cursor].iter().collect(), after)
}

/// Editable contents of the input box plus its submit history.
///
/// The cursor is a character index, so every edit goes through
/// `byte_index` before touching the `String`.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    /// Previously submitted entries, oldest first.
    history: Vec<String>,
    /// Position in history while browsing (`None` = editing the live input).
    history_index: Option<usize>,
    /// Live input saved while browsing history.
    saved_input: String,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Nothing but whitespace; such input is never sent.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert pasted text at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    pub fn backspace(&mut self) {
        let Some(prev) = self.cursor.checked_sub(1) else {
            return;
        };
        self.cursor = prev;
        self.remove_at_cursor();
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            self.remove_at_cursor();
        }
    }

    fn remove_at_cursor(&mut self) {
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Take the content for sending, recording it in history.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() {
            self.history.push(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Step back to an older submission, stashing the live draft first.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let index = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                self.history.len() - 1
            }
            Some(0) => return,
            Some(i) => i - 1,
        };

        self.history_index = Some(index);
        self.content.clone_from(&self.history[index]);
        self.move_end();
    }

    /// Step forward; past the newest entry the stashed draft comes back.
    pub fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };

        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.content.clone_from(&self.history[index + 1]);
        } else {
            self.history_index = None;
            self.content = std::mem::take(&mut self.saved_input);
        }
        self.move_end();
    }

    pub fn widget(&self) -> TextInput<'_> {
        TextInput {
            content: &self.content,
            cursor: self.cursor,
            block: None,
            focused: true,
            placeholder: None,
        }
    }
}
