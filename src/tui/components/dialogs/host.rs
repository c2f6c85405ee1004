//! Dialog host: renders the stack and routes input into it
//!
//! The host owns no dialog state of its own. Every draw pass re-reads the
//! manager's stack, so pushes and removals show up on the next frame and a
//! removed dialog is never drawn again. Input goes to the topmost dialog
//! only, through that entry's own result routing.

use super::manager::SuspendDialogManager;
use super::types::{DialogLayout, EntryId};
use crate::tui::{
    components::{Component, ComponentState},
    styles::Theme,
    Frame,
};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear},
};

/// Where a dialog was drawn on the last pass, for mouse hit testing
#[derive(Debug, Clone)]
struct DialogLayer {
    id: EntryId,
    layout: DialogLayout,
}

/// Mount once per manager, after everything else, so it overlays the screen
pub struct DialogHost {
    manager: SuspendDialogManager,
    layers: Vec<DialogLayer>,
    dim_background: bool,
    state: ComponentState,
}

impl DialogHost {
    pub fn new(manager: SuspendDialogManager) -> Self {
        Self {
            manager,
            layers: Vec::new(),
            dim_background: true,
            state: ComponentState::new(),
        }
    }

    /// Enable or disable dimming of the content under open dialogs
    pub fn with_background_dim(mut self, enabled: bool) -> Self {
        self.dim_background = enabled;
        self
    }

    pub fn manager(&self) -> &SuspendDialogManager {
        &self.manager
    }

    pub fn has_dialogs(&self) -> bool {
        !self.manager.is_empty()
    }

    /// Mount new entries and run their periodic work on the UI task
    pub fn pump(&mut self) {
        for slot in self.manager.slots() {
            if let Some(mut entry) = slot.lock_live() {
                entry.tick();
            }
        }
    }

    /// Draw every dialog in stack order, bottom first
    pub fn draw(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.layers.clear();
        let slots = self.manager.slots();
        if slots.is_empty() {
            return;
        }

        if self.dim_background {
            frame
                .buffer_mut()
                .set_style(area, Style::default().add_modifier(Modifier::DIM));
        }

        let top = slots.len() - 1;
        for (depth, slot) in slots.iter().enumerate() {
            let Some(mut entry) = slot.lock_live() else {
                continue;
            };
            let layout = DialogLayout::calculate(area, entry.preferred_size(), depth);

            let border_style = if depth == top {
                theme.focused_border_style()
            } else {
                theme.border_style()
            };
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .style(theme.dialog_style());
            if let Some(title) = entry.title() {
                block = block.title(format!(" {} ", title));
            }

            frame.render_widget(Clear, layout.dialog_area);
            frame.render_widget(block, layout.dialog_area);
            entry.render(frame, layout.content_area, theme);

            self.layers.push(DialogLayer {
                id: slot.id,
                layout,
            });
        }
    }

    /// Route a key to the topmost dialog; returns whether a dialog took it
    pub fn route_key(&mut self, key: KeyEvent) -> bool {
        let Some(top) = self.manager.slots().pop() else {
            return false;
        };

        // Removed since the snapshot; the key is consumed with no effect
        let Some(mut entry) = top.lock_live() else {
            return true;
        };
        if key.code == KeyCode::Esc && key.modifiers.is_empty() {
            entry.dismiss_request();
        } else {
            entry.handle_key_event(key);
        }
        true
    }

    /// Route a mouse event; a click outside the topmost dialog dismisses it
    pub fn route_mouse(&mut self, event: MouseEvent) -> bool {
        let Some(top) = self.manager.slots().pop() else {
            return false;
        };

        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return true;
        }

        // Not drawn yet, so there is nothing to hit test against
        let Some(layer) = self.layers.iter().find(|layer| layer.id == top.id) else {
            return true;
        };

        let Some(mut entry) = top.lock_live() else {
            return true;
        };
        if layer.layout.contains(event.column, event.row) {
            entry.handle_mouse_event(event, layer.layout.content_area);
        } else {
            entry.dismiss_request();
        }
        true
    }
}

#[async_trait]
impl Component for DialogHost {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        self.route_key(event);
        Ok(())
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<()> {
        self.route_mouse(event);
        Ok(())
    }

    async fn tick(&mut self) -> Result<()> {
        self.pump();
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.draw(frame, area, theme);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }

    fn has_focus(&self) -> bool {
        self.has_dialogs()
    }

    fn is_visible(&self) -> bool {
        self.has_dialogs()
    }
}
