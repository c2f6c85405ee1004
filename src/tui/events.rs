use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,

    /// Terminal input is no longer being read
    InputClosed,

    /// Status message event
    StatusMessage(String),

    /// Clear status message event
    ClearStatus,
}

/// Event handler for managing input events
pub struct EventHandler {
    /// Event receiver channel
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,

    /// Tick interval for periodic events
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            receiver,
            sender,
            tick_rate,
        }
    }

    /// Start reading terminal input on a blocking thread
    ///
    /// The reader stops once the handler is dropped. If it stops for any
    /// other reason, including a panic, it sends [`Event::InputClosed`].
    pub fn start(&self) {
        let sender = self.sender.clone();
        let tick_rate = self.tick_rate;

        tokio::task::spawn_blocking(move || {
            read_terminal_events(sender, tick_rate, crossterm::event::poll, crossterm::event::read);
        });
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Convert crossterm events to application events
    pub(crate) fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                Some(Event::Key(key_event))
            }
            CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            _ => None,
        }
    }

    /// Send an internal event
    pub fn send(&self, event: Event) -> Result<()> {
        self.sender.send(event)?;
        Ok(())
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

/// Announces the end of the reader loop, whether it returned or panicked
struct ReaderExit(mpsc::UnboundedSender<Event>);

impl Drop for ReaderExit {
    fn drop(&mut self) {
        debug!("Terminal event reader stopped");
        let _ = self.0.send(Event::InputClosed);
    }
}

/// Blocking reader loop: forwards terminal input and emits ticks
fn read_terminal_events<P, R>(
    sender: mpsc::UnboundedSender<Event>,
    tick_rate: Duration,
    mut poll: P,
    mut read: R,
) where
    P: FnMut(Duration) -> io::Result<bool>,
    R: FnMut() -> io::Result<CrosstermEvent>,
{
    let _exit = ReaderExit(sender.clone());
    let mut last_tick = Instant::now();
    loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        match poll(timeout) {
            Ok(true) => match read() {
                Ok(event) => {
                    if let Some(event) = EventHandler::convert_crossterm_event(event) {
                        if sender.send(event).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    warn!("Failed to read terminal event: {}", err);
                    return;
                }
            },
            Ok(false) => {}
            Err(err) => {
                warn!("Failed to poll terminal events: {}", err);
                return;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if sender.send(Event::Tick).is_err() {
                return;
            }
            last_tick = Instant::now();
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
