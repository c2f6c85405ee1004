//! Capabilities handed out for a single stack entry
//!
//! [`DialogHandle`] lets whoever holds it force the entry off the stack.
//! [`OnResult`] is the routing callback paired with an entry: it is the only
//! way a dialog resolves the `execute` call waiting on it.

use super::manager::StackState;
use super::types::{DialogResponse, EntryId};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Capability to remove one specific dialog from the stack
#[derive(Clone)]
pub struct DialogHandle {
    id: EntryId,
    stack: Weak<StackState>,
}

impl DialogHandle {
    pub(crate) fn new(id: EntryId, stack: &Arc<StackState>) -> Self {
        Self {
            id,
            stack: Arc::downgrade(stack),
        }
    }

    /// Identifier of the entry this handle is bound to
    pub fn id(&self) -> EntryId {
        self.id
    }

    /// Remove the bound entry from the stack
    ///
    /// Safe to call any number of times; once the entry is gone (or the
    /// manager itself was dropped) this does nothing.
    pub fn dismiss(&self) {
        if let Some(stack) = self.stack.upgrade() {
            if stack.remove(self.id) {
                debug!(entry = %self.id, "dialog dismissed");
            }
        }
    }

    /// Whether the bound entry is still on the stack
    pub fn is_active(&self) -> bool {
        self.stack
            .upgrade()
            .map(|stack| stack.contains(self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for DialogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogHandle").field("id", &self.id).finish()
    }
}

impl PartialEq for DialogHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DialogHandle {}

/// Wakes whoever observes the stack without mutating it
///
/// Work running off the UI task uses this after handing its result over, so
/// the UI loop comes around and picks the result up in its next tick.
#[derive(Clone)]
pub struct Repaint {
    stack: Weak<StackState>,
}

impl Repaint {
    pub fn request(&self) {
        if let Some(stack) = self.stack.upgrade() {
            stack.touch();
        }
    }
}

impl fmt::Debug for Repaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repaint").finish_non_exhaustive()
    }
}

/// Result routing for one entry
///
/// Resolves the waiting `execute` call at most once. Removal from the stack
/// always happens before the waiting call is completed.
pub struct OnResult<R> {
    handle: DialogHandle,
    auto_dismiss: bool,
    sender: Mutex<Option<oneshot::Sender<DialogResponse<R>>>>,
}

impl<R> OnResult<R> {
    pub(crate) fn new(
        handle: DialogHandle,
        auto_dismiss: bool,
        sender: oneshot::Sender<DialogResponse<R>>,
    ) -> Self {
        Self {
            handle,
            auto_dismiss,
            sender: Mutex::new(Some(sender)),
        }
    }

    /// Complete the request successfully
    pub fn success(&self, data: R) {
        let Some(sender) = self.take_sender() else {
            trace!(entry = %self.handle.id(), "ignoring result for resolved dialog");
            return;
        };

        if self.auto_dismiss {
            self.handle.dismiss();
        }

        debug!(entry = %self.handle.id(), auto_dismiss = self.auto_dismiss, "dialog resolved");
        let _ = sender.send(DialogResponse::Success {
            data,
            handle: self.handle.clone(),
        });
    }

    /// Cancel the request; the entry is removed even if it already resolved
    pub fn cancel(&self) {
        let sender = self.take_sender();
        self.handle.dismiss();

        match sender {
            Some(sender) => {
                debug!(entry = %self.handle.id(), "dialog cancelled");
                let _ = sender.send(DialogResponse::Cancel);
            }
            None => trace!(entry = %self.handle.id(), "cancel after resolution only dismissed"),
        }
    }

    /// Whether a terminal outcome was already delivered
    pub fn is_resolved(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn auto_dismiss(&self) -> bool {
        self.auto_dismiss
    }

    /// Handle bound to this entry, for dialogs that dismiss themselves
    pub fn handle(&self) -> &DialogHandle {
        &self.handle
    }

    pub fn repaint(&self) -> Repaint {
        Repaint {
            stack: self.handle.stack.clone(),
        }
    }

    fn take_sender(&self) -> Option<oneshot::Sender<DialogResponse<R>>> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<R> fmt::Debug for OnResult<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnResult")
            .field("entry", &self.handle.id())
            .field("auto_dismiss", &self.auto_dismiss)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
