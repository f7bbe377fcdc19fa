//! chatbot-tui: Terminal UI for the chatbot client
//!
//! This crate provides the interactive front end, including:
//! - Chat screen with model selector, transcript and input box
//! - Event loop that owns every dispatch task
//! - Shared widgets (text input, transcript, status bar)

mod app;
mod event;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod ui;

use screens::Screen as ScreenTrait;

pub use app::{App, Session};
pub use chatbot_engine;
pub use event::{Action, Event, EventHandler};

use chatbot_engine::{Dispatcher, OutboundRequest};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, buffer::Buffer, layout::Rect, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Tick interval driving the waiting spinner.
const TICK_RATE_MS: u64 = 250;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop over `session`, and restores
/// the terminal on exit. Requests are sent through `dispatcher`.
pub async fn run_tui(
    session: Session,
    dispatcher: Arc<dyn Dispatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(session, Rect::new(0, 0, size.width, size.height));
    let mut events = EventHandler::new(TICK_RATE_MS);

    info!(
        model = app.model().id(),
        messages = app.session.messages().len(),
        "TUI started"
    );

    let result = run_loop(&mut terminal, &mut app, &mut events, dispatcher).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    dispatcher: Arc<dyn Dispatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tx = events.sender();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            draw(app, area, frame.buffer_mut());
        })?;

        let Some(event) = events.next().await else {
            break;
        };

        let outbound = match event {
            Event::Key(key) => app.handle_action(event::key_to_action(key)),
            Event::Mouse(mouse) => app.handle_action(event::mouse_to_action(mouse)),
            Event::Tick => {
                app.tick();
                None
            }
            Event::Resize(width, height) => {
                app.resize(width, height);
                None
            }
            Event::Paste(text) => {
                app.paste(&text);
                None
            }
            Event::Reply { id, result } => app.apply_reply(id, result),
        };

        if let Some(request) = outbound {
            tasks.push(spawn_dispatch(Arc::clone(&dispatcher), request, tx.clone()));
        }
        tasks.retain(|handle| !handle.is_finished());

        if app.should_quit {
            if !tasks.is_empty() {
                debug!(outstanding = tasks.len(), "Aborting outstanding requests");
            }
            for handle in tasks {
                handle.abort();
            }
            break;
        }
    }

    info!("TUI exited");
    Ok(())
}

/// Draw the whole UI for `app`.
pub fn draw(app: &App, area: Rect, buf: &mut Buffer) {
    screens::chat::ChatScreen.render(app, area, buf);

    if app.show_help {
        screens::render_help_overlay(area, buf);
    }
}

/// Dispatch `request` on a task and post the result back as an event.
fn spawn_dispatch(
    dispatcher: Arc<dyn Dispatcher>,
    request: OutboundRequest,
    tx: mpsc::UnboundedSender<Event>,
) -> JoinHandle<()> {
    debug!(
        request_id = request.id,
        model = request.model.id(),
        "Dispatching chat request"
    );
    tokio::spawn(async move {
        let result = dispatcher
            .dispatch(request.model.id(), &request.user_message)
            .await;
        // The loop may already be gone on quit
        let _ = tx.send(Event::Reply {
            id: request.id,
            result,
        });
    })
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
