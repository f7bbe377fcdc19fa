//! Application state for the chatbot TUI.
//!
//! `App` is driven entirely by the event loop: key actions come in through
//! [`App::handle_action`] and dispatch results through [`App::apply_reply`].
//! Both return the next request to put on the wire, if any, so the loop owns
//! every spawned task and the state itself never touches the network.

use crate::event::Action;
use crate::ui::layout::transcript_viewport;
use crate::ui::widgets::{message_lines, TextInputState};
use chatbot_engine::{
    ChatSession, DispatchError, KeyValueStore, MemoryStore, ModelChoice, OutboundRequest,
    RequestId,
};
use ratatui::layout::Rect;

/// Lines moved per mouse wheel notch.
const WHEEL_STEP: usize = 3;

/// Conversation session backed by any key-value store.
pub type Session = ChatSession<Box<dyn KeyValueStore>>;

/// Application state.
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Conversation plus outstanding requests.
    pub session: Session,

    /// Pending text in the input box.
    pub input_state: TextInputState,

    /// Lines scrolled back from the latest message (0 = follow latest).
    pub transcript_scroll: usize,

    /// Tick counter for animations.
    pub tick: usize,

    /// Terminal area last seen by the loop.
    pub area: Rect,

    /// Store revision the scroll position was last reset for.
    seen_revision: u64,
}

impl App {
    /// Create a new app over `session`, sized to `area`.
    pub fn new(session: Session, area: Rect) -> Self {
        let seen_revision = session.store().revision();
        Self {
            should_quit: false,
            show_help: false,
            session,
            input_state: TextInputState::new(),
            transcript_scroll: 0,
            tick: 0,
            area,
            seen_revision,
        }
    }

    /// An 80x24 app over an empty in-memory store.
    pub fn new_for_test() -> Self {
        let storage: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        Self::new(
            ChatSession::load(storage, ModelChoice::default()),
            Rect::new(0, 0, 80, 24),
        )
    }

    /// Currently selected model.
    pub fn model(&self) -> ModelChoice {
        self.session.model()
    }

    /// Handle an action.
    ///
    /// Returns a request that must be dispatched now, if the action released
    /// one.
    pub fn handle_action(&mut self, action: Action) -> Option<OutboundRequest> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                return None;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return None;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            if action != Action::None {
                self.show_help = false;
            }
            return None;
        }

        let outbound = match action {
            Action::Back => {
                self.should_quit = true;
                None
            }
            Action::Send => self.send_input(),
            Action::NextModel => {
                self.session.select_model(self.model().next());
                None
            }
            Action::PrevModel => {
                self.session.select_model(self.model().prev());
                None
            }
            Action::Clear => {
                self.session.clear();
                None
            }
            Action::Up => {
                self.input_state.history_prev();
                None
            }
            Action::Down => {
                self.input_state.history_next();
                None
            }
            Action::PageUp => {
                self.scroll_up(self.page_size());
                None
            }
            Action::PageDown => {
                self.scroll_down(self.page_size());
                None
            }
            Action::ScrollUp => {
                self.scroll_up(WHEEL_STEP);
                None
            }
            Action::ScrollDown => {
                self.scroll_down(WHEEL_STEP);
                None
            }
            Action::Insert(c) => {
                self.input_state.insert(c);
                None
            }
            Action::Backspace => {
                self.input_state.backspace();
                None
            }
            Action::Delete => {
                self.input_state.delete();
                None
            }
            Action::Left => {
                self.input_state.move_left();
                None
            }
            Action::Right => {
                self.input_state.move_right();
                None
            }
            Action::Home => {
                self.input_state.move_home();
                None
            }
            Action::End => {
                self.input_state.move_end();
                None
            }
            Action::Quit | Action::Help | Action::None => None,
        };

        self.follow_latest();
        outbound
    }

    /// Apply the result of a dispatched request.
    pub fn apply_reply(
        &mut self,
        id: RequestId,
        result: Result<String, DispatchError>,
    ) -> Option<OutboundRequest> {
        let next = self.session.resolve(id, result);
        self.follow_latest();
        next
    }

    /// Insert pasted text into the input.
    ///
    /// The input is a single line, so line breaks become spaces.
    pub fn paste(&mut self, text: &str) {
        if self.show_help {
            return;
        }
        let line: String = text
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        self.input_state.insert_str(&line);
    }

    /// Increment tick counter.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Record a new terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        self.transcript_scroll = self.transcript_scroll.min(self.max_scroll());
    }

    /// Whether a reply is still outstanding.
    pub fn is_waiting(&self) -> bool {
        self.session.is_awaiting_reply()
    }

    fn send_input(&mut self) -> Option<OutboundRequest> {
        // Blank input stays in the box untouched
        if self.input_state.is_blank() {
            return None;
        }
        let text = self.input_state.submit();
        self.session.submit(&text)
    }

    /// Snap back to the latest message whenever the conversation changed.
    fn follow_latest(&mut self) {
        let revision = self.session.store().revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.transcript_scroll = 0;
        }
    }

    fn page_size(&self) -> usize {
        (transcript_viewport(self.area).height as usize)
            .saturating_sub(1)
            .max(1)
    }

    fn max_scroll(&self) -> usize {
        let viewport = transcript_viewport(self.area);
        // One column is reserved for the scrollbar
        let width = (viewport.width as usize).saturating_sub(1);
        message_lines(self.session.messages(), width)
            .len()
            .saturating_sub(viewport.height as usize)
    }

    fn scroll_up(&mut self, lines: usize) {
        self.transcript_scroll = (self.transcript_scroll + lines).min(self.max_scroll());
    }

    fn scroll_down(&mut self, lines: usize) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_engine::{Message, RequestStatus};

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_action(Action::Insert(c));
        }
    }

    #[test]
    fn test_new_app_defaults() {
        let app = App::new_for_test();
        assert!(!app.should_quit);
        assert!(!app.show_help);
        assert_eq!(app.model(), ModelChoice::Instruct);
        assert!(app.session.messages().is_empty());
        assert!(app.input_state.is_empty());
    }

    #[test]
    fn test_send_appends_user_message_and_clears_input() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hello");

        let request = app.handle_action(Action::Send).expect("request released");

        assert_eq!(request.model, ModelChoice::Instruct);
        assert_eq!(request.user_message, "hello");
        assert_eq!(app.session.messages(), &[Message::user("hello")]);
        assert!(app.input_state.is_empty());
        assert!(app.is_waiting());
    }

    #[test]
    fn test_blank_send_leaves_input_untouched() {
        let mut app = App::new_for_test();
        type_text(&mut app, "   ");

        assert!(app.handle_action(Action::Send).is_none());
        assert_eq!(app.input_state.content(), "   ");
        assert!(app.session.messages().is_empty());
    }

    #[test]
    fn test_reply_appends_bot_message() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hello");
        let request = app.handle_action(Action::Send).expect("request released");

        let next = app.apply_reply(request.id, Ok("hi there".to_string()));

        assert!(next.is_none());
        assert_eq!(
            app.session.messages(),
            &[Message::user("hello"), Message::bot("hi there")]
        );
        assert!(!app.is_waiting());
    }

    #[test]
    fn test_failed_reply_keeps_user_message_only() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hello");
        let request = app.handle_action(Action::Send).expect("request released");

        let err = DispatchError::Status {
            status: 500,
            body: String::new(),
        };
        app.apply_reply(request.id, Err(err));

        assert_eq!(app.session.messages(), &[Message::user("hello")]);
        assert!(!app.is_waiting());
    }

    #[test]
    fn test_second_send_waits_for_first_reply() {
        let mut app = App::new_for_test();
        type_text(&mut app, "one");
        let first = app.handle_action(Action::Send).expect("first released");
        type_text(&mut app, "two");
        assert!(app.handle_action(Action::Send).is_none());
        assert_eq!(app.session.status(first.id + 1), Some(RequestStatus::Queued));

        let second = app
            .apply_reply(first.id, Ok("first reply".to_string()))
            .expect("second released");
        assert_eq!(second.user_message, "two");
        app.apply_reply(second.id, Ok("second reply".to_string()));

        let texts: Vec<&str> = app
            .session
            .messages()
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, ["one", "two", "first reply", "second reply"]);
    }

    #[test]
    fn test_model_cycling() {
        let mut app = App::new_for_test();
        app.handle_action(Action::NextModel);
        assert_eq!(app.model(), ModelChoice::Mistral);
        app.handle_action(Action::PrevModel);
        app.handle_action(Action::PrevModel);
        assert_eq!(app.model(), ModelChoice::Phi15);
    }

    #[test]
    fn test_model_selection_keeps_pending_text() {
        let mut app = App::new_for_test();
        type_text(&mut app, "draft");
        app.handle_action(Action::NextModel);
        assert_eq!(app.input_state.content(), "draft");
    }

    #[test]
    fn test_request_uses_model_selected_at_send_time() {
        let mut app = App::new_for_test();
        app.handle_action(Action::NextModel);
        type_text(&mut app, "hello");
        let request = app.handle_action(Action::Send).expect("request released");
        assert_eq!(request.model, ModelChoice::Mistral);
    }

    #[test]
    fn test_clear_empties_conversation() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hello");
        let request = app.handle_action(Action::Send).expect("request released");
        app.apply_reply(request.id, Ok("hi".to_string()));

        app.handle_action(Action::Clear);
        assert!(app.session.messages().is_empty());
    }

    #[test]
    fn test_help_toggle_and_close() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Help);
        assert!(app.show_help);

        // Keys close help instead of editing
        app.handle_action(Action::Insert('x'));
        assert!(!app.show_help);
        assert!(app.input_state.is_empty());

        app.handle_action(Action::Help);
        app.handle_action(Action::Back);
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Back);
        assert!(app.should_quit);

        let mut app = App::new_for_test();
        app.handle_action(Action::Help);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_paste_flattens_line_breaks() {
        let mut app = App::new_for_test();
        type_text(&mut app, "a ");
        app.paste("first\r\nsecond");
        assert_eq!(app.input_state.content(), "a first second");

        let request = app.handle_action(Action::Send).expect("request released");
        assert_eq!(request.user_message, "a first second");
    }

    #[test]
    fn test_input_history_recall() {
        let mut app = App::new_for_test();
        type_text(&mut app, "hello");
        let request = app.handle_action(Action::Send).expect("request released");
        app.apply_reply(request.id, Ok("hi".to_string()));

        app.handle_action(Action::Up);
        assert_eq!(app.input_state.content(), "hello");
        app.handle_action(Action::Down);
        assert!(app.input_state.is_empty());
    }

    fn fill_conversation(app: &mut App, count: usize) {
        for i in 0..count {
            type_text(app, &format!("message {i}"));
            let request = app.handle_action(Action::Send).expect("request released");
            app.apply_reply(request.id, Ok(format!("reply {i}")));
        }
    }

    #[test]
    fn test_scroll_back_and_clamp() {
        let mut app = App::new_for_test();
        fill_conversation(&mut app, 20);
        assert_eq!(app.transcript_scroll, 0);

        app.handle_action(Action::PageUp);
        assert!(app.transcript_scroll > 0);

        for _ in 0..50 {
            app.handle_action(Action::PageUp);
        }
        let max = app.max_scroll();
        assert_eq!(app.transcript_scroll, max);

        app.handle_action(Action::ScrollDown);
        assert_eq!(app.transcript_scroll, max - WHEEL_STEP);

        for _ in 0..50 {
            app.handle_action(Action::PageDown);
        }
        assert_eq!(app.transcript_scroll, 0);
    }

    #[test]
    fn test_new_message_snaps_to_latest() {
        let mut app = App::new_for_test();
        fill_conversation(&mut app, 20);
        app.handle_action(Action::ScrollUp);
        assert_eq!(app.transcript_scroll, WHEEL_STEP);

        type_text(&mut app, "more");
        assert_eq!(app.transcript_scroll, WHEEL_STEP);
        app.handle_action(Action::Send);
        assert_eq!(app.transcript_scroll, 0);
    }

    #[test]
    fn test_short_conversation_does_not_scroll() {
        let mut app = App::new_for_test();
        fill_conversation(&mut app, 1);
        app.handle_action(Action::PageUp);
        assert_eq!(app.transcript_scroll, 0);
    }
}
