//! Awaitable, stackable modal dialogs for ratatui applications
//!
//! ```no_run
//! use suspend_dialogs::{ConfirmRequest, SuspendDialogManager};
//!
//! # async fn example(manager: SuspendDialogManager) {
//! let response = manager
//!     .execute(ConfirmRequest::new("Delete", "Remove the file?"))
//!     .await;
//! if response.is_success() {
//!     // the dialog is already gone
//! }
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod tui;

pub use tui::components::dialogs::{
    ConfirmRequest, DialogHandle, DialogHost, DialogRequest, DialogResponse, InputRequest,
    LoadingRequest, OnResult, SuspendDialogManager,
};
