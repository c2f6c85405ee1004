//! Core dialog types and traits
//!
//! This module defines the request contract every dialog implements and the
//! tagged response an awaiting caller receives back from the manager.

use super::handle::{DialogHandle, OnResult};
use crate::tui::{styles::Theme, Frame};
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;
use std::fmt;
use uuid::Uuid;

/// Unique token identifying one `execute` call and the stack entry it pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal outcome of a dialog request
///
/// `Success` always carries the handle of the entry that produced it. When
/// the request auto-dismisses, the entry is already gone by the time the
/// caller sees the result and calling `dismiss()` on the handle is a no-op.
#[derive(Debug)]
pub enum DialogResponse<R> {
    Success { data: R, handle: DialogHandle },
    Cancel,
}

impl<R> DialogResponse<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel)
    }

    /// Borrow the payload of a successful response
    pub fn data(&self) -> Option<&R> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Cancel => None,
        }
    }

    /// Borrow the handle of a successful response
    pub fn handle(&self) -> Option<&DialogHandle> {
        match self {
            Self::Success { handle, .. } => Some(handle),
            Self::Cancel => None,
        }
    }

    /// Split a successful response into its payload and handle
    pub fn into_success(self) -> Option<(R, DialogHandle)> {
        match self {
            Self::Success { data, handle } => Some((data, handle)),
            Self::Cancel => None,
        }
    }
}

impl<R: fmt::Debug> fmt::Display for DialogResponse<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { data, .. } => write!(f, "Success({:?})", data),
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

/// Contract for a dialog that can be awaited through the dialog manager
///
/// A request owns its presentation state (typed text, a processing flag and
/// so on) for as long as its entry sits on the stack, so that state survives
/// every redraw. Results are delivered through the `OnResult` passed to the
/// interaction callbacks; `render` only draws.
pub trait DialogRequest: Send + 'static {
    /// Payload delivered with a successful response
    type Output: Send + 'static;

    /// Whether a successful result removes the dialog immediately
    fn auto_dismiss(&self) -> bool {
        true
    }

    /// Short name used in logs and stack snapshots
    fn kind(&self) -> &'static str {
        "dialog"
    }

    /// Title drawn in the dialog frame
    fn title(&self) -> Option<&str> {
        None
    }

    /// Preferred outer size (width, height) including the frame
    fn preferred_size(&self) -> (u16, u16) {
        (44, 8)
    }

    /// Runs exactly once, before the first tick or render of the entry
    fn on_mount(&mut self, on_result: &OnResult<Self::Output>) {
        let _ = on_result;
    }

    /// Periodic heartbeat on the UI task
    fn tick(&mut self, on_result: &OnResult<Self::Output>) {
        let _ = on_result;
    }

    /// Draw the dialog content inside its frame
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Handle a key routed to this dialog while it is topmost
    fn handle_key_event(&mut self, key: KeyEvent, on_result: &OnResult<Self::Output>);

    /// Handle a mouse event inside the dialog's content area
    fn handle_mouse_event(
        &mut self,
        event: MouseEvent,
        area: Rect,
        on_result: &OnResult<Self::Output>,
    ) {
        let _ = (event, area, on_result);
    }

    /// Escape or a click outside the dialog
    fn on_dismiss_request(&mut self, on_result: &OnResult<Self::Output>) {
        on_result.cancel();
    }
}

/// Helper struct for dialog layout calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLayout {
    /// Full available area
    pub available_area: Rect,
    /// Dialog area (including border)
    pub dialog_area: Rect,
    /// Content area (excluding border)
    pub content_area: Rect,
}

impl DialogLayout {
    /// Horizontal and vertical shift applied per stack level
    const CASCADE: (u16, u16) = (2, 1);

    /// Center a dialog of the preferred size, shifted by its stack depth
    pub fn calculate(available_area: Rect, preferred: (u16, u16), depth: usize) -> Self {
        let width = preferred.0.min(available_area.width);
        let height = preferred.1.min(available_area.height);

        let depth = u16::try_from(depth).unwrap_or(u16::MAX);
        let base_x = available_area.x + available_area.width.saturating_sub(width) / 2;
        let base_y = available_area.y + available_area.height.saturating_sub(height) / 2;
        let max_x = available_area.x + available_area.width.saturating_sub(width);
        let max_y = available_area.y + available_area.height.saturating_sub(height);
        let x = base_x.saturating_add(depth.saturating_mul(Self::CASCADE.0)).min(max_x);
        let y = base_y.saturating_add(depth.saturating_mul(Self::CASCADE.1)).min(max_y);

        let dialog_area = Rect { x, y, width, height };
        let content_area = Rect {
            x: dialog_area.x.saturating_add(1),
            y: dialog_area.y.saturating_add(1),
            width: dialog_area.width.saturating_sub(2),
            height: dialog_area.height.saturating_sub(2),
        };

        Self {
            available_area,
            dialog_area,
            content_area,
        }
    }

    /// Whether a terminal cell lies inside the dialog frame
    pub fn contains(&self, column: u16, row: u16) -> bool {
        let area = self.dialog_area;
        column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
    }
}

/// Braille spinner frames shared by the processing states
pub(crate) const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
