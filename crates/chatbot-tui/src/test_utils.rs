//! Helpers for rendering the chat UI into in-memory buffers.

use crate::app::App;
use crate::event::Action;
use crate::screens::Screen as ScreenTrait;
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

pub const TEST_WIDTH: u16 = 80;
pub const TEST_HEIGHT: u16 = 24;

/// Terminal over a `TestBackend` at the default test size.
pub fn create_test_terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(TEST_WIDTH, TEST_HEIGHT)).expect("test backend never fails")
}

/// App over an empty in-memory conversation.
pub fn create_test_app() -> App {
    App::new_for_test()
}

/// App holding `count` completed exchanges: `message {i}` / `reply {i}`.
pub fn create_test_app_with_exchanges(count: usize) -> App {
    let mut app = App::new_for_test();
    for i in 0..count {
        for c in format!("message {i}").chars() {
            app.handle_action(Action::Insert(c));
        }
        let request = app
            .handle_action(Action::Send)
            .expect("idle session releases the request");
        app.apply_reply(request.id, Ok(format!("reply {i}")));
    }
    app
}

/// Buffer contents as text: one line per row, trailing blanks dropped.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            let row: String = (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol())
                .collect();
            row.trim_end_matches(' ').to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `screen` at the default test size.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Style;

    #[test]
    fn test_terminal_has_default_size() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!((size.width, size.height), (TEST_WIDTH, TEST_HEIGHT));
    }

    #[test]
    fn test_buffer_rows_are_trimmed() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 10, 3));
        buffer.set_string(0, 0, "You:", Style::default());
        buffer.set_string(2, 2, "Bot:", Style::default());

        assert_eq!(buffer_to_string(&buffer), "You:\n\n  Bot:");
    }

    #[test]
    fn test_exchanges_are_stored() {
        let app = create_test_app_with_exchanges(3);
        let messages = app.session.store().messages();
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[5].text, "reply 2");
        assert!(!app.is_waiting());
    }
}
