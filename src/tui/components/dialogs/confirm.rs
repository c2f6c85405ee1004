//! Confirmation dialog
//!
//! Asks a yes/no question. Confirming resolves with `Success(())`; the cancel
//! button, Escape or a click outside resolve with `Cancel`. When the request
//! does not auto-dismiss, confirming switches the dialog into a processing
//! state that stays on screen until the caller dismisses it.

use super::handle::OnResult;
use super::types::{DialogRequest, SPINNER_FRAMES};
use crate::tui::{styles::Theme, Frame};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmButton {
    Confirm,
    Cancel,
}

/// Two-button confirmation request
#[derive(Debug, Clone)]
pub struct ConfirmRequest {
    title: String,
    message: String,
    auto_dismiss: bool,
    confirm_label: String,
    cancel_label: String,
    selected: ConfirmButton,
    processing: bool,
    spinner_frame: usize,
    /// Button rectangles from the last render, for mouse clicks
    button_areas: Option<(Rect, Rect)>,
}

impl ConfirmRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            auto_dismiss: true,
            confirm_label: "Confirm".to_string(),
            cancel_label: "Cancel".to_string(),
            selected: ConfirmButton::Confirm,
            processing: false,
            spinner_frame: 0,
            button_areas: None,
        }
    }

    /// Keep the dialog mounted after confirming until the caller dismisses it
    pub fn with_auto_dismiss(mut self, auto_dismiss: bool) -> Self {
        self.auto_dismiss = auto_dismiss;
        self
    }

    /// Set custom button labels
    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = confirm.into();
        self.cancel_label = cancel.into();
        self
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    fn toggle_selection(&mut self) {
        self.selected = match self.selected {
            ConfirmButton::Confirm => ConfirmButton::Cancel,
            ConfirmButton::Cancel => ConfirmButton::Confirm,
        };
    }

    fn confirm(&mut self, on_result: &OnResult<()>) {
        if self.processing {
            return;
        }
        if !self.auto_dismiss {
            self.processing = true;
        }
        on_result.success(());
    }

    fn cancel(&mut self, on_result: &OnResult<()>) {
        // The caller owns the dialog once it is processing
        if self.processing {
            return;
        }
        on_result.cancel();
    }

    fn activate_selected(&mut self, on_result: &OnResult<()>) {
        match self.selected {
            ConfirmButton::Confirm => self.confirm(on_result),
            ConfirmButton::Cancel => self.cancel(on_result),
        }
    }

    fn button_style(&self, button: ConfirmButton, theme: &Theme) -> Style {
        if self.processing && button == ConfirmButton::Cancel {
            return theme.disabled_style();
        }
        if self.selected == button {
            theme.selection_style()
        } else {
            theme.text_style()
        }
    }

    fn render_buttons(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let button_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let confirm_text = if self.processing {
            format!(" {} Working ", SPINNER_FRAMES[self.spinner_frame])
        } else {
            format!(" {} ", self.confirm_label)
        };

        let confirm_button = Paragraph::new(confirm_text)
            .style(self.button_style(ConfirmButton::Confirm, theme))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(confirm_button, button_layout[0]);

        let cancel_button = Paragraph::new(format!(" {} ", self.cancel_label))
            .style(self.button_style(ConfirmButton::Cancel, theme))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(cancel_button, button_layout[1]);

        self.button_areas = Some((button_layout[0], button_layout[1]));
    }
}

impl DialogRequest for ConfirmRequest {
    type Output = ();

    fn auto_dismiss(&self) -> bool {
        self.auto_dismiss
    }

    fn kind(&self) -> &'static str {
        "confirm"
    }

    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn preferred_size(&self) -> (u16, u16) {
        let message_width = u16::try_from(self.message.width()).unwrap_or(u16::MAX);
        let width = message_width.saturating_add(4).clamp(44, 72);
        (width, 9)
    }

    fn tick(&mut self, _on_result: &OnResult<()>) {
        if self.processing {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(3)])
            .split(area);

        let message = Paragraph::new(self.message.clone())
            .style(theme.text_style())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[0]);

        self.render_buttons(frame, chunks[1], theme);
    }

    fn handle_key_event(&mut self, key: KeyEvent, on_result: &OnResult<()>) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                if !self.processing {
                    self.toggle_selection();
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_selected(on_result),
            KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm(on_result),
            KeyCode::Char('n') | KeyCode::Char('N') => self.cancel(on_result),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent, _area: Rect, on_result: &OnResult<()>) {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let Some((confirm_area, cancel_area)) = self.button_areas else {
            return;
        };

        let hit = |area: Rect| {
            event.column >= area.x
                && event.column < area.x + area.width
                && event.row >= area.y
                && event.row < area.y + area.height
        };
        if hit(confirm_area) {
            self.confirm(on_result);
        } else if hit(cancel_area) {
            self.cancel(on_result);
        }
    }

    fn on_dismiss_request(&mut self, on_result: &OnResult<()>) {
        self.cancel(on_result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::dialogs::host::DialogHost;
    use crate::tui::components::dialogs::manager::{testing::*, SuspendDialogManager};
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_confirm_request_defaults() {
        let request = ConfirmRequest::new("Title", "Message");
        assert!(request.auto_dismiss());
        assert_eq!(request.kind(), "confirm");
        assert_eq!(request.title(), Some("Title"));
        assert!(!request.is_processing());
        assert_eq!(request.preferred_size(), (44, 9));
    }

    #[tokio::test]
    async fn test_confirm_resolves_and_empties_stack() {
        let manager = SuspendDialogManager::new();
        let mut host = DialogHost::new(manager.clone());

        let issuer = manager.clone();
        let task = tokio::spawn(async move { issuer.execute(ConfirmRequest::new("T", "M")).await });
        wait_for_len(&manager, 1).await;

        host.route_key(press(KeyCode::Enter));
        assert!(manager.is_empty());

        let ((), handle) = task.await.unwrap().into_success().expect("confirmed");
        handle.dismiss();
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_button_and_shortcut() {
        let manager = SuspendDialogManager::new();
        let mut host = DialogHost::new(manager.clone());

        let issuer = manager.clone();
        let task = tokio::spawn(async move { issuer.execute(ConfirmRequest::new("T", "M")).await });
        wait_for_len(&manager, 1).await;

        // Move to the cancel button and press it
        host.route_key(press(KeyCode::Tab));
        host.route_key(press(KeyCode::Enter));
        assert!(task.await.unwrap().is_cancel());

        let issuer = manager.clone();
        let task = tokio::spawn(async move { issuer.execute(ConfirmRequest::new("T", "M")).await });
        wait_for_len(&manager, 1).await;
        host.route_key(key('n'));
        assert!(task.await.unwrap().is_cancel());
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_manual_confirm_enters_processing_state() {
        let manager = SuspendDialogManager::new();
        let mut host = DialogHost::new(manager.clone());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::default();

        let issuer = manager.clone();
        let task = tokio::spawn(async move {
            issuer
                .execute(ConfirmRequest::new("Delete", "Really?").with_auto_dismiss(false))
                .await
        });
        wait_for_len(&manager, 1).await;

        host.route_key(key('y'));
        let (_, handle) = task.await.unwrap().into_success().expect("confirmed");
        assert_eq!(manager.len(), 1);

        // Cancel paths are disabled while processing
        host.route_key(press(KeyCode::Esc));
        host.route_key(key('n'));
        assert_eq!(manager.len(), 1);

        host.pump();
        terminal
            .draw(|frame| {
                let area = frame.size();
                host.draw(frame, area, &theme);
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Working"));

        handle.dismiss();
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_mouse_click_on_confirm_button() {
        let manager = SuspendDialogManager::new();
        let mut host = DialogHost::new(manager.clone());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::default();

        let issuer = manager.clone();
        let task = tokio::spawn(async move { issuer.execute(ConfirmRequest::new("T", "M")).await });
        wait_for_len(&manager, 1).await;

        terminal
            .draw(|frame| {
                let area = frame.size();
                host.draw(frame, area, &theme);
            })
            .unwrap();

        // Confirm button occupies the left half of the bottom three rows
        let dialog = crate::tui::components::dialogs::types::DialogLayout::calculate(
            Rect::new(0, 0, 80, 24),
            (44, 9),
            0,
        );
        let content = dialog.content_area;
        let row = content.y + content.height - 2;
        host.route_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: content.x + 2,
            row,
            modifiers: KeyModifiers::NONE,
        });

        assert!(task.await.unwrap().is_success());
        assert!(manager.is_empty());
    }
}
