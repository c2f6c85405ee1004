//! Awaitable dialog system for modal UI components
//!
//! Application code calls [`SuspendDialogManager::execute`] with a request
//! and awaits the user's answer from any task. The manager keeps the pending
//! requests on an ordered stack; a single [`DialogHost`] mounted on top of the
//! screen draws that stack and feeds input back into it.
//!
//! New dialog types implement [`DialogRequest`]; nothing needs registering.

pub mod confirm;
pub mod handle;
pub mod host;
pub mod input;
pub mod loading;
pub mod manager;
pub mod types;

pub use confirm::ConfirmRequest;
pub use handle::{DialogHandle, OnResult, Repaint};
pub use host::DialogHost;
pub use input::InputRequest;
pub use loading::LoadingRequest;
pub use manager::{DialogEntryInfo, SuspendDialogManager};
pub use types::*;
