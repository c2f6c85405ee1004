//! Terminal user interface built on ratatui
//!
//! The demo screen lists actions; each action awaits dialogs from its own
//! task while this loop renders the dialog stack and feeds input into it.

pub mod app;
pub mod components;
pub mod events;
pub mod keys;
pub mod styles;

pub use app::App;
pub use events::{Event, EventHandler};
pub use keys::KeyMap;

use crate::config::Config;
use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use tracing::{error, info};

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal(mouse_enabled: bool) -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse_enabled {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Restore the terminal before reporting a panic on the UI thread
///
/// Panics on other threads (spawned dialog work, the input reader) are only
/// logged; their owners turn them into a cancelled dialog or a clean exit.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let thread = std::thread::current();
        if panic_restores_terminal(thread.name()) {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            error!("Application panicked: {}", panic_info);
            previous(panic_info);
        } else {
            error!(
                thread = thread.name().unwrap_or("unnamed"),
                "Background task panicked: {}", panic_info
            );
        }
    }));
}

/// The event loop runs on the main thread
fn panic_restores_terminal(thread_name: Option<&str>) -> bool {
    thread_name == Some("main")
}

/// Main TUI entry point
pub async fn run(config: Config) -> Result<()> {
    let mut terminal = init_terminal(config.mouse_enabled)?;
    let mut event_handler = EventHandler::new(config.tick_rate());
    let mut app = App::new(config, event_handler.sender());
    event_handler.start();
    info!("Demo screen started");

    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    app.shutdown();
    restore_terminal(&mut terminal)?;
    info!("Demo screen closed");
    result
}

/// Main application loop
///
/// Redraws after every terminal event and after every change to the
/// dialog stack, so dialogs pushed or removed by other tasks show up
/// without waiting for the next tick.
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    let mut stack_changes = app.manager().subscribe();
    let mut stack_open = true;

    loop {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            event = event_handler.next() => {
                let Some(event) = event else {
                    break;
                };
                if app.handle_event(event).await? {
                    break;
                }
            }
            changed = stack_changes.changed(), if stack_open => {
                if changed.is_err() {
                    stack_open = false;
                } else {
                    app.handle_event(Event::Tick).await?;
                }
            }
        }
    }
    Ok(())
}
