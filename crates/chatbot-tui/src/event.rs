//! Event handling for the chatbot TUI.

use chatbot_engine::{DispatchError, RequestId};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything the main loop reacts to: terminal input plus finished requests.
#[derive(Debug)]
pub enum Event {
    /// Key press (releases and repeats are filtered out).
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// No terminal input within one tick.
    Tick,
    Resize(u16, u16),
    /// Bracketed paste.
    Paste(String),
    /// A dispatched request finished.
    Reply {
        id: RequestId,
        result: Result<String, DispatchError>,
    },
}

/// Map a raw terminal event to a loop event, dropping the ones the UI ignores.
fn translate(raw: CrosstermEvent) -> Option<Event> {
    match raw {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
        _ => None,
    }
}

/// Merges terminal input and dispatch results into one channel.
///
/// Dispatch tasks post their results through [`EventHandler::sender`], so
/// every state change is applied by the single loop reading [`next`].
///
/// [`next`]: EventHandler::next
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Start polling the terminal; a `Tick` is sent after each quiet `tick_ms`.
    pub fn new(tick_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let input_tx = tx.clone();
        let tick = Duration::from_millis(tick_ms);

        // crossterm polling blocks, so it runs on a plain thread
        std::thread::spawn(move || loop {
            let next = match event::poll(tick) {
                Ok(true) => event::read().ok().and_then(translate),
                _ => Some(Event::Tick),
            };
            // The loop has exited once the receiver is gone
            if let Some(event) = next {
                if input_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    /// Handle for dispatch tasks to post `Event::Reply`.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Wait for the next event. `None` once every sender is dropped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Back,
    Send,
    NextModel,
    PrevModel,
    Clear,
    Up,
    Down,
    PageUp,
    PageDown,
    ScrollUp,
    ScrollDown,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    None,
}

/// Convert a key event to an action.
pub fn key_to_action(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('l') => Action::Clear,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::F(1) => Action::Help,
        KeyCode::Esc => Action::Back,
        KeyCode::Enter => Action::Send,
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                Action::PrevModel
            } else {
                Action::NextModel
            }
        }
        KeyCode::BackTab => Action::PrevModel,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => Action::Insert(c),
        _ => Action::None,
    }
}

/// Convert a mouse event to an action.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}
