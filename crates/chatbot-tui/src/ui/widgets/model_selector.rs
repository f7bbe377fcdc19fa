//! Model selector bar.

use crate::ui::theme::Styles;
use chatbot_engine::ModelChoice;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

/// A horizontal list of the available models with the selection highlighted.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    selected: ModelChoice,
}

impl ModelSelector {
    pub fn new(selected: ModelChoice) -> Self {
        Self { selected }
    }
}

impl Widget for ModelSelector {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let mut spans = Vec::new();

        for (i, model) in ModelChoice::ALL.iter().enumerate() {
            spans.push(Span::styled(if i == 0 { " " } else { " | " }, Styles::dim()));
            if *model == self.selected {
                spans.push(Span::styled(
                    format!("[{}]", model.label()),
                    Styles::highlight(),
                ));
            } else {
                spans.push(Span::styled(model.label(), Styles::dim()));
            }
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
