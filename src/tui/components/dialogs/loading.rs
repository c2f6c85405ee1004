//! Loading dialog that resolves when its work finishes
//!
//! The work is spawned once, when the entry is first mounted. Its value is
//! handed back over a oneshot channel and delivered from `tick`, so the
//! result always reaches the stack from the UI task.

use super::handle::{OnResult, Repaint};
use super::types::{DialogRequest, SPINNER_FRAMES};
use crate::tui::{styles::Theme, Frame};
use crossterm::event::KeyEvent;
use futures::future::{BoxFuture, FutureExt};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::fmt;
use std::future::Future;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

/// Wakes the UI loop when the spawned work ends, even by panicking
struct WakeOnExit(Repaint);

impl Drop for WakeOnExit {
    fn drop(&mut self) {
        self.0.request();
    }
}

/// Progress dialog without user dismissal
pub struct LoadingRequest<T> {
    message: String,
    title: Option<String>,
    auto_dismiss: bool,
    work: Option<BoxFuture<'static, T>>,
    result: Option<oneshot::Receiver<T>>,
    task: Option<JoinHandle<()>>,
    spinner_frame: usize,
}

impl<T: Send + 'static> LoadingRequest<T> {
    pub fn new<F>(message: impl Into<String>, work: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            message: message.into(),
            title: None,
            auto_dismiss: true,
            work: Some(work.boxed()),
            result: None,
            task: None,
            spinner_frame: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_auto_dismiss(mut self, auto_dismiss: bool) -> Self {
        self.auto_dismiss = auto_dismiss;
        self
    }

    pub fn is_started(&self) -> bool {
        self.work.is_none()
    }
}

impl<T: Send + 'static> DialogRequest for LoadingRequest<T> {
    type Output = T;

    fn auto_dismiss(&self) -> bool {
        self.auto_dismiss
    }

    fn kind(&self) -> &'static str {
        "loading"
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn preferred_size(&self) -> (u16, u16) {
        let message_width = u16::try_from(self.message.width()).unwrap_or(u16::MAX);
        (message_width.saturating_add(10).clamp(30, 60), 5)
    }

    fn on_mount(&mut self, on_result: &OnResult<T>) {
        let Some(work) = self.work.take() else {
            return;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!("loading dialog mounted outside a Tokio runtime: {}", err);
                on_result.cancel();
                return;
            }
        };

        let (sender, receiver) = oneshot::channel();
        let wake = WakeOnExit(on_result.repaint());
        self.task = Some(runtime.spawn(async move {
            let _wake = wake;
            let _ = sender.send(work.await);
        }));
        self.result = Some(receiver);
        debug!(entry = %on_result.handle().id(), "loading work started");
    }

    fn tick(&mut self, on_result: &OnResult<T>) {
        let Some(receiver) = self.result.as_mut() else {
            return;
        };

        match receiver.try_recv() {
            Ok(value) => {
                self.result = None;
                self.task = None;
                on_result.success(value);
            }
            Err(TryRecvError::Empty) => {
                self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
            }
            Err(TryRecvError::Closed) => {
                self.result = None;
                self.task = None;
                warn!(entry = %on_result.handle().id(), "loading work ended without a result");
                on_result.cancel();
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        let line = Line::from(vec![
            Span::styled(SPINNER_FRAMES[self.spinner_frame], theme.accent_style()),
            Span::raw("  "),
            Span::styled(self.message.clone(), theme.text_style()),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), chunks[1]);
    }

    fn handle_key_event(&mut self, _key: KeyEvent, _on_result: &OnResult<T>) {}

    fn on_dismiss_request(&mut self, _on_result: &OnResult<T>) {}
}

impl<T> Drop for LoadingRequest<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<T> fmt::Debug for LoadingRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingRequest")
            .field("message", &self.message)
            .field("title", &self.title)
            .field("auto_dismiss", &self.auto_dismiss)
            .field("started", &self.work.is_none())
            .finish()
    }
}
