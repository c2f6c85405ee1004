//! Demo screen: a list of actions, each issuing dialogs from its own task

use super::dialogs::{
    ConfirmRequest, DialogResponse, InputRequest, LoadingRequest, SuspendDialogManager,
};
use super::{Component, ComponentState};
use crate::config::DemoConfig;
use crate::tui::{events::Event, styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tokio::sync::mpsc;
use tracing::debug;

/// Actions offered by the demo screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoAction {
    Confirm,
    Input,
    Loading,
    Chained,
}

impl DemoAction {
    pub const ALL: [DemoAction; 4] = [
        DemoAction::Confirm,
        DemoAction::Input,
        DemoAction::Loading,
        DemoAction::Chained,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DemoAction::Confirm => "Show Confirm",
            DemoAction::Input => "Show Input",
            DemoAction::Loading => "Show Loading",
            DemoAction::Chained => "Show Input then Loading",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DemoAction::Confirm => "Stays open while the confirmed action runs",
            DemoAction::Input => "Asks for a line of text",
            DemoAction::Loading => "Waits for background work",
            DemoAction::Chained => "Keeps the input open under a loading dialog",
        }
    }
}

/// Run one demo flow to completion, reporting results as status messages
pub async fn run_action(
    action: DemoAction,
    manager: SuspendDialogManager,
    config: DemoConfig,
    status: mpsc::UnboundedSender<Event>,
) {
    debug!(?action, "demo action started");
    let report = |message: String| {
        let _ = status.send(Event::StatusMessage(message));
    };

    match action {
        DemoAction::Confirm => {
            let request = ConfirmRequest::new("Confirm", "Run the demo action?")
                .with_auto_dismiss(false);
            match manager.execute(request).await.into_success() {
                Some(((), handle)) => {
                    report("result: confirmed".to_string());
                    tokio::time::sleep(config.processing_delay()).await;
                    handle.dismiss();
                }
                None => report("result: Cancel".to_string()),
            }
        }
        DemoAction::Input => {
            let response = manager
                .execute(InputRequest::new("Enter a title", "Title"))
                .await;
            report(format!("result: {}", response));
        }
        DemoAction::Loading => {
            let delay = config.loading_delay();
            let response = manager
                .execute(LoadingRequest::new("Loading...", async move {
                    tokio::time::sleep(delay).await;
                    "Loading complete".to_string()
                }))
                .await;
            report(format!("result: {}", response));
        }
        DemoAction::Chained => {
            let input = manager
                .execute(InputRequest::new("Enter a title", "Title").with_auto_dismiss(false))
                .await;
            match input {
                DialogResponse::Success { data, handle } => {
                    let delay = config.loading_delay();
                    let result = manager
                        .execute(LoadingRequest::new("Loading...", async move {
                            tokio::time::sleep(delay).await;
                            format!("Loading complete: {}", data)
                        }))
                        .await;
                    handle.dismiss();
                    report(format!("input: {}", result));
                }
                DialogResponse::Cancel => report("input: Cancel".to_string()),
            }
        }
    }
}

/// Action list shown underneath the dialogs
pub struct DemoPanel {
    state: ComponentState,
    list_state: ListState,
    list_area: Option<Rect>,
    pending: Option<DemoAction>,
}

impl DemoPanel {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            state: ComponentState::new().with_focus(true),
            list_state,
            list_area: None,
            pending: None,
        }
    }

    pub fn selected(&self) -> DemoAction {
        let index = self.list_state.selected().unwrap_or(0);
        DemoAction::ALL[index.min(DemoAction::ALL.len() - 1)]
    }

    /// Take the action activated since the last call
    pub fn take_action(&mut self) -> Option<DemoAction> {
        self.pending.take()
    }

    fn select(&mut self, index: usize) {
        self.list_state.select(Some(index % DemoAction::ALL.len()));
    }

    fn activate(&mut self, index: usize) {
        self.select(index);
        self.pending = Some(self.selected());
    }
}

impl Default for DemoPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for DemoPanel {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        let current = self.list_state.selected().unwrap_or(0);
        let count = DemoAction::ALL.len();
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => self.select(current + count - 1),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.select(current + 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(current),
            KeyCode::Char(c @ '1'..='4') => self.activate(c as usize - '1' as usize),
            _ => {}
        }
        Ok(())
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<()> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(());
        }
        let Some(area) = self.list_area else {
            return Ok(());
        };

        let inside = event.column >= area.x
            && event.column < area.x + area.width
            && event.row >= area.y
            && event.row < area.y + area.height;
        if inside {
            let index = usize::from(event.row - area.y);
            if index < DemoAction::ALL.len() {
                self.activate(index);
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.state.size = area;

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Suspend Dialogs ")
            .border_style(theme.border_style())
            .style(theme.base_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(DemoAction::ALL.len() as u16),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let header = Paragraph::new(Line::from(Span::styled(
            "Pick an action; every dialog is awaited by its own task",
            theme.title_style(),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = DemoAction::ALL
            .iter()
            .enumerate()
            .map(|(index, action)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {}. ", index + 1), theme.accent_style()),
                    Span::styled(action.label(), theme.text_style()),
                    Span::styled(format!("  {}", action.description()), theme.help_style()),
                ]))
            })
            .collect();
        let list = List::new(items).highlight_style(theme.selection_style());
        frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
        self.list_area = Some(chunks[1]);

        let help = Paragraph::new("↑/↓: Select • Enter/1-4: Run • q: Quit")
            .style(theme.help_style())
            .alignment(Alignment::Center);
        frame.render_widget(help, chunks[2]);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }

    fn has_focus(&self) -> bool {
        self.state.has_focus
    }

    fn set_focus(&mut self, focus: bool) {
        self.state.has_focus = focus;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::dialogs::manager::testing::wait_for_len;
    use crate::tui::components::dialogs::DialogHost;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn fast_config() -> DemoConfig {
        DemoConfig {
            loading_delay_ms: 10,
            processing_delay_ms: 10,
            status_timeout_ms: 10,
        }
    }

    async fn next_status(receiver: &mut mpsc::UnboundedReceiver<Event>) -> String {
        match tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await {
            Ok(Some(Event::StatusMessage(message))) => message,
            other => panic!("expected a status message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panel_selection_and_activation() {
        let mut panel = DemoPanel::new();
        assert_eq!(panel.selected(), DemoAction::Confirm);

        panel.handle_key_event(press(KeyCode::Up)).await.unwrap();
        assert_eq!(panel.selected(), DemoAction::Chained);
        panel.handle_key_event(press(KeyCode::Down)).await.unwrap();
        assert_eq!(panel.selected(), DemoAction::Confirm);
        assert!(panel.take_action().is_none());

        panel.handle_key_event(press(KeyCode::Enter)).await.unwrap();
        assert_eq!(panel.take_action(), Some(DemoAction::Confirm));
        assert!(panel.take_action().is_none());

        panel.handle_key_event(press(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(panel.take_action(), Some(DemoAction::Loading));
        assert_eq!(panel.selected(), DemoAction::Loading);
    }

    #[tokio::test]
    async fn test_panel_click_activates_row() {
        let mut panel = DemoPanel::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| {
                let area = frame.size();
                panel.render(frame, area, &theme);
            })
            .unwrap();

        let area = panel.list_area.unwrap();
        panel
            .handle_mouse_event(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: area.x + 2,
                row: area.y + 1,
                modifiers: KeyModifiers::NONE,
            })
            .await
            .unwrap();
        assert_eq!(panel.take_action(), Some(DemoAction::Input));
    }

    #[tokio::test]
    async fn test_confirm_flow_stays_open_while_processing() {
        let manager = SuspendDialogManager::new();
        let mut host = DialogHost::new(manager.clone());
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_action(
            DemoAction::Confirm,
            manager.clone(),
            DemoConfig {
                processing_delay_ms: 100,
                ..fast_config()
            },
            sender,
        ));
        wait_for_len(&manager, 1).await;

        host.route_key(press(KeyCode::Enter));
        assert_eq!(next_status(&mut receiver).await, "result: confirmed");
        assert_eq!(manager.len(), 1);

        wait_for_len(&manager, 0).await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_chained_flow_dismisses_input_after_loading() {
        let manager = SuspendDialogManager::new();
        let mut host = DialogHost::new(manager.clone());
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_action(
            DemoAction::Chained,
            manager.clone(),
            fast_config(),
            sender,
        ));
        wait_for_len(&manager, 1).await;

        for c in "abc".chars() {
            host.route_key(press(KeyCode::Char(c)));
        }
        host.route_key(press(KeyCode::Enter));
        wait_for_len(&manager, 2).await;

        let mut changes = manager.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.len() != 0 {
                host.pump();
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(
            next_status(&mut receiver).await,
            "input: Success(\"Loading complete: abc\")"
        );
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_input_reports_cancel() {
        let manager = SuspendDialogManager::new();
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_action(
            DemoAction::Input,
            manager.clone(),
            fast_config(),
            sender,
        ));
        wait_for_len(&manager, 1).await;

        manager.cancel_all();
        assert_eq!(next_status(&mut receiver).await, "result: Cancel");
        task.await.unwrap();
    }
}
