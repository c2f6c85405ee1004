use crate::config::Config;
use crate::tui::{
    components::{
        demo::{run_action, DemoAction, DemoPanel},
        dialogs::{DialogHost, SuspendDialogManager},
        Component,
    },
    events::Event,
    keys::KeyMap,
    styles::Theme,
    Frame,
};
use anyhow::Result;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::Paragraph;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Current application dimensions
    pub size: Rect,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Current theme for styling
    pub theme: Theme,

    /// Status message to display and when it expires
    pub status_message: Option<(String, Instant)>,

    /// Application configuration
    pub config: Config,

    /// Dialog stack shared with every issuing task
    manager: SuspendDialogManager,

    /// Overlay drawing the dialog stack
    host: DialogHost,

    /// Action list underneath the dialogs
    panel: DemoPanel,

    /// Event sender for internal communication
    event_sender: mpsc::UnboundedSender<Event>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, event_sender: mpsc::UnboundedSender<Event>) -> Self {
        let manager = SuspendDialogManager::new();
        let host = DialogHost::new(manager.clone()).with_background_dim(config.dim_background);

        Self {
            should_quit: false,
            size: Rect::default(),
            key_map: KeyMap::default(),
            theme: Theme::by_name(&config.theme),
            status_message: None,
            config,
            manager,
            host,
            panel: DemoPanel::new(),
            event_sender,
        }
    }

    pub fn manager(&self) -> &SuspendDialogManager {
        &self.manager
    }

    /// Handle incoming events
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => {
                if self.key_map.should_quit(&key_event, self.host.has_dialogs()) {
                    self.shutdown();
                    return Ok(true);
                }

                if self.host.has_dialogs() {
                    self.host.handle_key_event(key_event).await?;
                } else {
                    self.panel.handle_key_event(key_event).await?;
                    self.launch_pending();
                }
            }

            Event::Mouse(mouse_event) => {
                if self.config.mouse_enabled {
                    if self.host.has_dialogs() {
                        self.host.handle_mouse_event(mouse_event).await?;
                    } else {
                        self.panel.handle_mouse_event(mouse_event).await?;
                        self.launch_pending();
                    }
                }
            }

            Event::InputClosed => {
                warn!("Terminal input closed, shutting down");
                self.shutdown();
                return Ok(true);
            }

            Event::Resize(width, height) => {
                self.size = Rect::new(0, 0, width, height);
                self.panel.set_size(self.size);
                self.host.set_size(self.size);
            }

            Event::Tick => {
                self.host.tick().await?;
                self.panel.tick().await?;

                let expired = self
                    .status_message
                    .as_ref()
                    .is_some_and(|(_, expires_at)| Instant::now() >= *expires_at);
                if expired {
                    self.status_message = None;
                }
            }

            Event::StatusMessage(message) => {
                let expires_at = Instant::now() + self.config.demo.status_timeout();
                self.status_message = Some((message, expires_at));
            }

            Event::ClearStatus => {
                self.status_message = None;
            }
        }

        Ok(self.should_quit)
    }

    /// Run activated demo actions on their own tasks
    fn launch_pending(&mut self) {
        while let Some(action) = self.panel.take_action() {
            self.launch(action);
        }
    }

    fn launch(&self, action: DemoAction) {
        info!(?action, "Launching demo action");
        tokio::spawn(run_action(
            action,
            self.manager.clone(),
            self.config.demo.clone(),
            self.event_sender.clone(),
        ));
    }

    /// Resolve every pending dialog so issuing tasks can finish
    pub fn shutdown(&mut self) {
        if !self.manager.is_empty() {
            info!(pending = self.manager.len(), "Cancelling open dialogs");
        }
        self.manager.cancel_all();
        self.should_quit = true;
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.size = frame.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(frame.size());

        self.panel.render(frame, chunks[0], &self.theme);
        self.render_status_bar(frame, chunks[1]);

        // Dialogs overlay everything, so they are drawn last
        self.host.render(frame, frame.size(), &self.theme);
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status_text = match &self.status_message {
            Some((message, _)) => message.clone(),
            None => format!(
                "Open dialogs: {} | Ctrl+C to quit",
                self.manager.len()
            ),
        };

        let status_paragraph = Paragraph::new(status_text).style(self.theme.status_bar_style());

        frame.render_widget(status_paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::dialogs::manager::testing::wait_for_len;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn test_app() -> (App, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut config = Config::default();
        config.demo.loading_delay_ms = 10;
        config.demo.processing_delay_ms = 10;
        (App::new(config, sender), receiver)
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_digit_opens_dialog_and_keys_route_to_it() {
        let (mut app, mut receiver) = test_app();
        let manager = app.manager().clone();

        assert!(!app.handle_event(press(KeyCode::Char('2'))).await.unwrap());
        wait_for_len(&manager, 1).await;

        // 'q' is typed into the input instead of quitting
        assert!(!app.handle_event(press(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(manager.len(), 1);

        app.handle_event(press(KeyCode::Enter)).await.unwrap();
        wait_for_len(&manager, 0).await;

        let status = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .unwrap();
        assert!(matches!(status, Some(Event::StatusMessage(message)) if message == "result: Success(\"q\")"));
    }

    #[tokio::test]
    async fn test_status_message_shows_and_expires() {
        let (mut app, _receiver) = test_app();

        app.handle_event(Event::StatusMessage("result: Cancel".to_string()))
            .await
            .unwrap();
        assert!(screen_text(&mut app).contains("result: Cancel"));

        app.config.demo.status_timeout_ms = 0;
        app.handle_event(Event::StatusMessage("gone soon".to_string()))
            .await
            .unwrap();
        app.handle_event(Event::Tick).await.unwrap();
        assert!(app.status_message.is_none());
        assert!(screen_text(&mut app).contains("Open dialogs: 0"));
    }

    #[tokio::test]
    async fn test_render_draws_panel_and_dialog_overlay() {
        let (mut app, _receiver) = test_app();
        assert!(screen_text(&mut app).contains("Show Confirm"));

        app.handle_event(press(KeyCode::Enter)).await.unwrap();
        wait_for_len(app.manager(), 1).await;
        assert!(screen_text(&mut app).contains("Run the demo action?"));

        app.shutdown();
        assert!(app.manager().is_empty());
    }

    #[tokio::test]
    async fn test_quit_cancels_open_dialogs() {
        let (mut app, mut receiver) = test_app();
        let manager = app.manager().clone();

        app.handle_event(press(KeyCode::Char('3'))).await.unwrap();
        wait_for_len(&manager, 1).await;

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.handle_event(ctrl_c).await.unwrap());
        assert!(app.should_quit);
        assert!(manager.is_empty());

        let status = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .unwrap();
        assert!(matches!(status, Some(Event::StatusMessage(message)) if message == "result: Cancel"));
    }

    #[tokio::test]
    async fn test_closed_input_quits_and_cancels_dialogs() {
        let (mut app, mut receiver) = test_app();
        let manager = app.manager().clone();

        app.handle_event(press(KeyCode::Char('1'))).await.unwrap();
        wait_for_len(&manager, 1).await;

        assert!(app.handle_event(Event::InputClosed).await.unwrap());
        assert!(manager.is_empty());

        let status = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .unwrap();
        assert!(matches!(status, Some(Event::StatusMessage(message)) if message == "result: Cancel"));
    }

    #[tokio::test]
    async fn test_q_quits_without_dialogs() {
        let (mut app, _receiver) = test_app();
        assert!(app.handle_event(press(KeyCode::Char('q'))).await.unwrap());
    }
}
