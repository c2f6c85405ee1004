//! Dialog manager for handling the dialog stack and awaiting callers
//!
//! The dialog manager is responsible for:
//! - Owning the ordered stack of pending dialogs (last = topmost)
//! - Turning `execute(request).await` into a pushed entry plus a suspended caller
//! - Routing each entry's result back to exactly the caller that pushed it
//! - Cleaning up entries whose caller stopped waiting

use super::handle::{DialogHandle, OnResult};
use super::types::{DialogRequest, DialogResponse, EntryId};
use crate::tui::{styles::Theme, Frame};
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, watch};
use tracing::debug;

/// Object-safe view of a [`DialogEntry`], so one stack can hold dialogs with
/// different output types
pub(crate) trait StackEntry: Send {
    fn title(&self) -> Option<&str>;
    fn preferred_size(&self) -> (u16, u16);
    fn mount(&mut self);
    fn tick(&mut self);
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
    fn handle_key_event(&mut self, key: KeyEvent);
    fn handle_mouse_event(&mut self, event: MouseEvent, area: Rect);
    fn dismiss_request(&mut self);
}

/// A request paired with the routing callback of the call that issued it
pub(crate) struct DialogEntry<Q: DialogRequest> {
    request: Q,
    on_result: OnResult<Q::Output>,
    mounted: bool,
}

impl<Q: DialogRequest> DialogEntry<Q> {
    fn new(request: Q, on_result: OnResult<Q::Output>) -> Self {
        Self {
            request,
            on_result,
            mounted: false,
        }
    }
}

impl<Q: DialogRequest> StackEntry for DialogEntry<Q> {
    fn title(&self) -> Option<&str> {
        self.request.title()
    }

    fn preferred_size(&self) -> (u16, u16) {
        self.request.preferred_size()
    }

    fn mount(&mut self) {
        if !self.mounted {
            self.mounted = true;
            self.request.on_mount(&self.on_result);
        }
    }

    fn tick(&mut self) {
        self.mount();
        self.request.tick(&self.on_result);
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.mount();
        self.request.render(frame, area, theme);
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        self.request.handle_key_event(key, &self.on_result);
    }

    fn handle_mouse_event(&mut self, event: MouseEvent, area: Rect) {
        self.request.handle_mouse_event(event, area, &self.on_result);
    }

    fn dismiss_request(&mut self) {
        self.request.on_dismiss_request(&self.on_result);
    }
}

pub(crate) type SharedEntry = Arc<Mutex<Box<dyn StackEntry>>>;

/// One slot of the stack
#[derive(Clone)]
pub(crate) struct StackSlot {
    pub(crate) id: EntryId,
    pub(crate) kind: &'static str,
    pub(crate) auto_dismiss: bool,
    pub(crate) entry: SharedEntry,
    /// Set under the stack lock when the slot leaves the stack
    removed: Arc<AtomicBool>,
}

impl StackSlot {
    fn new(id: EntryId, kind: &'static str, auto_dismiss: bool, entry: Box<dyn StackEntry>) -> Self {
        Self {
            id,
            kind,
            auto_dismiss,
            entry: Arc::new(Mutex::new(entry)),
            removed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Lock the entry itself; never call while holding the stack lock
    pub(crate) fn lock(&self) -> MutexGuard<'_, Box<dyn StackEntry>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the entry, or `None` if it already left the stack
    ///
    /// A slot removed after this returns is treated as removed after the
    /// caller's draw or input pass.
    pub(crate) fn lock_live(&self) -> Option<MutexGuard<'_, Box<dyn StackEntry>>> {
        let entry = self.lock();
        if self.is_removed() {
            None
        } else {
            Some(entry)
        }
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
    }
}

/// Shared stack storage plus its change signal
pub(crate) struct StackState {
    slots: Mutex<Vec<StackSlot>>,
    revision: watch::Sender<u64>,
}

impl StackState {
    pub(crate) fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            slots: Mutex::new(Vec::new()),
            revision,
        }
    }

    fn slots(&self) -> MutexGuard<'_, Vec<StackSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, slot: StackSlot) -> usize {
        let depth = {
            let mut slots = self.slots();
            slots.push(slot);
            slots.len()
        };
        self.touch();
        depth
    }

    /// Remove the slot with the given id; returns whether anything changed
    pub(crate) fn remove(&self, id: EntryId) -> bool {
        let removed = {
            let mut slots = self.slots();
            let index = slots.iter().position(|slot| slot.id == id);
            index.map(|index| {
                let slot = slots.remove(index);
                slot.mark_removed();
                slot
            })
        };

        match removed {
            Some(slot) => {
                self.touch();
                // Dropped here, outside the stack lock
                drop(slot);
                true
            }
            None => false,
        }
    }

    fn clear(&self) -> Vec<StackSlot> {
        let removed = {
            let mut slots = self.slots();
            slots.iter().for_each(StackSlot::mark_removed);
            std::mem::take(&mut *slots)
        };
        if !removed.is_empty() {
            self.touch();
        }
        removed
    }

    pub(crate) fn contains(&self, id: EntryId) -> bool {
        self.slots().iter().any(|slot| slot.id == id)
    }

    pub(crate) fn snapshot(&self) -> Vec<StackSlot> {
        self.slots().clone()
    }

    fn len(&self) -> usize {
        self.slots().len()
    }

    pub(crate) fn touch(&self) {
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

/// Read-only description of one pending dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogEntryInfo {
    pub id: EntryId,
    pub kind: &'static str,
    pub auto_dismiss: bool,
}

/// Removes the entry if the waiting `execute` future is dropped early
struct PendingGuard {
    handle: DialogHandle,
    armed: bool,
}

impl PendingGuard {
    fn new(handle: DialogHandle) -> Self {
        Self {
            handle,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.armed {
            debug!(entry = %self.handle.id(), "caller stopped waiting, removing dialog");
            self.handle.dismiss();
        }
    }
}

/// Owns the dialog stack and suspends callers until their dialog resolves
///
/// Cloning is cheap and every clone shares the same stack, so a clone can be
/// moved into each task that issues dialogs.
#[derive(Clone)]
pub struct SuspendDialogManager {
    state: Arc<StackState>,
}

impl SuspendDialogManager {
    /// Create a new dialog manager with an empty stack
    pub fn new() -> Self {
        Self {
            state: Arc::new(StackState::new()),
        }
    }

    /// Show a dialog and wait for its terminal outcome
    ///
    /// The entry is pushed on top of the stack when the returned future is
    /// first polled. If the future is dropped before the dialog resolves,
    /// the entry is removed from the stack.
    pub async fn execute<Q: DialogRequest>(&self, request: Q) -> DialogResponse<Q::Output> {
        let id = EntryId::new();
        let kind = request.kind();
        let auto_dismiss = request.auto_dismiss();
        let handle = DialogHandle::new(id, &self.state);
        let (sender, receiver) = oneshot::channel();

        let on_result = OnResult::new(handle.clone(), auto_dismiss, sender);
        let entry: Box<dyn StackEntry> = Box::new(DialogEntry::new(request, on_result));
        let depth = self.state.push(StackSlot::new(id, kind, auto_dismiss, entry));
        debug!(entry = %id, kind, auto_dismiss, depth, "dialog pushed");

        let mut guard = PendingGuard::new(handle);
        let response = match receiver.await {
            Ok(response) => response,
            Err(_) => {
                debug!(entry = %id, "dialog removed before resolving");
                DialogResponse::Cancel
            }
        };
        guard.disarm();

        response
    }

    /// Remove every dialog; their pending callers resolve to `Cancel`
    pub fn cancel_all(&self) {
        let removed = self.state.clear();
        if !removed.is_empty() {
            debug!(count = removed.len(), "cancelled all dialogs");
        }
    }

    /// Subscribe to stack changes
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.state.subscribe()
    }

    /// Number of dialogs on the stack
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Check if any dialogs are open
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.state.contains(id)
    }

    /// Entry ids in stack order (bottom first)
    pub fn entry_ids(&self) -> Vec<EntryId> {
        self.state.snapshot().iter().map(|slot| slot.id).collect()
    }

    /// Snapshot of the stack in order (bottom first)
    pub fn entries(&self) -> Vec<DialogEntryInfo> {
        self.state
            .snapshot()
            .iter()
            .map(|slot| DialogEntryInfo {
                id: slot.id,
                kind: slot.kind,
                auto_dismiss: slot.auto_dismiss,
            })
            .collect()
    }

    pub(crate) fn slots(&self) -> Vec<StackSlot> {
        self.state.snapshot()
    }
}

impl Default for SuspendDialogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SuspendDialogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspendDialogManager")
            .field("entries", &self.entries())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use tokio::task::JoinHandle;

    fn spawn_execute(
        manager: &SuspendDialogManager,
        request: ScriptedRequest,
    ) -> JoinHandle<DialogResponse<u32>> {
        let manager = manager.clone();
        tokio::spawn(async move { manager.execute(request).await })
    }

    #[tokio::test]
    async fn test_auto_dismiss_success_empties_stack() {
        let manager = SuspendDialogManager::new();
        let task = spawn_execute(&manager, ScriptedRequest::new(42));
        wait_for_len(&manager, 1).await;

        let id = manager.entry_ids()[0];
        send_key_to(&manager, id, key('y'));
        assert!(manager.is_empty());

        let response = task.await.unwrap();
        let (data, handle) = response.into_success().expect("success");
        assert_eq!(data, 42);
        assert_eq!(handle.id(), id);
        assert!(!handle.is_active());
    }

    #[tokio::test]
    async fn test_concurrent_requests_keep_push_order() {
        let manager = SuspendDialogManager::new();
        let mut tasks = Vec::new();
        for value in 0..3 {
            tasks.push(spawn_execute(&manager, ScriptedRequest::new(value)));
            wait_for_len(&manager, value as usize + 1).await;
        }

        let ids = manager.entry_ids();
        assert_eq!(ids.len(), 3);
        assert!(manager.entries().iter().all(|info| info.kind == "scripted"));

        // Resolve the middle one only
        send_key_to(&manager, ids[1], key('y'));
        assert_eq!(manager.entry_ids(), vec![ids[0], ids[2]]);

        let middle = tasks.remove(1).await.unwrap();
        assert_eq!(middle.data(), Some(&1));
        assert!(tasks.iter().all(|task| !task.is_finished()));

        manager.cancel_all();
        for task in tasks {
            assert!(task.await.unwrap().is_cancel());
        }
    }

    #[tokio::test]
    async fn test_manual_success_stays_until_dismissed() {
        let manager = SuspendDialogManager::new();
        let task = spawn_execute(&manager, ScriptedRequest::manual(5));
        wait_for_len(&manager, 1).await;

        let id = manager.entry_ids()[0];
        send_key_to(&manager, id, key('y'));
        let (data, handle) = task.await.unwrap().into_success().expect("success");
        assert_eq!(data, 5);
        assert_eq!(manager.len(), 1);
        assert!(handle.is_active());

        handle.dismiss();
        assert!(manager.is_empty());
        let after_first = manager.entry_ids();

        handle.dismiss();
        assert_eq!(manager.entry_ids(), after_first);
    }

    #[tokio::test]
    async fn test_cancel_removes_regardless_of_auto_dismiss() {
        let manager = SuspendDialogManager::new();
        let auto = spawn_execute(&manager, ScriptedRequest::new(1));
        wait_for_len(&manager, 1).await;
        let manual = spawn_execute(&manager, ScriptedRequest::manual(2));
        wait_for_len(&manager, 2).await;

        let ids = manager.entry_ids();
        send_key_to(&manager, ids[1], key('n'));
        assert_eq!(manager.entry_ids(), vec![ids[0]]);
        send_key_to(&manager, ids[0], key('n'));
        assert!(manager.is_empty());

        assert!(auto.await.unwrap().is_cancel());
        assert!(manual.await.unwrap().is_cancel());
    }

    #[tokio::test]
    async fn test_double_success_delivers_first_only() {
        let manager = SuspendDialogManager::new();
        let task = spawn_execute(&manager, ScriptedRequest::manual(10));
        wait_for_len(&manager, 1).await;

        send_key_to(&manager, manager.entry_ids()[0], key('Y'));
        assert_eq!(task.await.unwrap().data(), Some(&10));
    }

    #[tokio::test]
    async fn test_aborted_caller_removes_auto_dismiss_entry() {
        let manager = SuspendDialogManager::new();
        let task = spawn_execute(&manager, ScriptedRequest::new(1));
        wait_for_len(&manager, 1).await;

        task.abort();
        let err = task.await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(manager.is_empty());
    }

    // Boundary case: a cancelled caller can never dismiss a manual dialog,
    // so the entry is removed for both dismiss policies.
    #[tokio::test]
    async fn test_aborted_caller_removes_manual_entry() {
        let manager = SuspendDialogManager::new();
        let sibling = spawn_execute(&manager, ScriptedRequest::new(0));
        wait_for_len(&manager, 1).await;
        let task = spawn_execute(&manager, ScriptedRequest::manual(1));
        wait_for_len(&manager, 2).await;
        let sibling_id = manager.entry_ids()[0];

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(manager.entry_ids(), vec![sibling_id]);

        send_key_to(&manager, sibling_id, key('y'));
        assert_eq!(sibling.await.unwrap().data(), Some(&0));
    }

    #[tokio::test]
    async fn test_self_dismiss_before_resolving_yields_cancel() {
        let manager = SuspendDialogManager::new();
        let task = spawn_execute(&manager, ScriptedRequest::new(3));
        wait_for_len(&manager, 1).await;

        send_key_to(&manager, manager.entry_ids()[0], key('d'));
        assert!(manager.is_empty());
        assert!(task.await.unwrap().is_cancel());
    }

    #[tokio::test]
    async fn test_handle_only_removes_its_own_entry() {
        let manager = SuspendDialogManager::new();
        let first = spawn_execute(&manager, ScriptedRequest::manual(7));
        wait_for_len(&manager, 1).await;
        let second = spawn_execute(&manager, ScriptedRequest::manual(7));
        wait_for_len(&manager, 2).await;

        let ids = manager.entry_ids();
        send_key_to(&manager, ids[0], key('y'));
        send_key_to(&manager, ids[1], key('y'));
        let (_, first_handle) = first.await.unwrap().into_success().unwrap();
        let (_, second_handle) = second.await.unwrap().into_success().unwrap();
        assert_ne!(first_handle, second_handle);

        second_handle.dismiss();
        assert_eq!(manager.entry_ids(), vec![ids[0]]);
        second_handle.dismiss();
        assert_eq!(manager.entry_ids(), vec![ids[0]]);

        first_handle.dismiss();
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_nested_execute_from_continuation() {
        let manager = SuspendDialogManager::new();
        let issuer = manager.clone();
        let task = tokio::spawn(async move {
            let outer = issuer.execute(ScriptedRequest::manual(1)).await;
            let (_, outer_handle) = outer.into_success().expect("outer success");
            let inner = issuer.execute(ScriptedRequest::new(2)).await;
            outer_handle.dismiss();
            inner
        });

        wait_for_len(&manager, 1).await;
        let outer_id = manager.entry_ids()[0];
        send_key_to(&manager, outer_id, key('y'));

        wait_for_len(&manager, 2).await;
        let ids = manager.entry_ids();
        assert_eq!(ids[0], outer_id);
        send_key_to(&manager, ids[1], key('y'));

        let inner = task.await.unwrap();
        assert_eq!(inner.data(), Some(&2));
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_stack_changes_are_signalled() {
        let manager = SuspendDialogManager::new();
        let mut changes = manager.subscribe();
        let task = spawn_execute(&manager, ScriptedRequest::new(1));

        changes.changed().await.unwrap();
        assert_eq!(manager.len(), 1);

        send_key_to(&manager, manager.entry_ids()[0], key('y'));
        changes.changed().await.unwrap();
        assert!(manager.is_empty());
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_removed_slots_are_flagged() {
        let manager = SuspendDialogManager::new();
        let first = spawn_execute(&manager, ScriptedRequest::manual(1));
        wait_for_len(&manager, 1).await;
        let second = spawn_execute(&manager, ScriptedRequest::manual(2));
        wait_for_len(&manager, 2).await;

        // Snapshots taken before removal must not hand out removed entries
        let stale = manager.slots();
        assert!(stale.iter().all(|slot| slot.lock_live().is_some()));

        send_key_to(&manager, stale[1].id, key('n'));
        assert!(stale[1].is_removed());
        assert!(stale[1].lock_live().is_none());
        assert!(stale[0].lock_live().is_some());

        manager.cancel_all();
        assert!(stale[0].lock_live().is_none());
        assert!(first.await.unwrap().is_cancel());
        assert!(second.await.unwrap().is_cancel());
    }

    #[test]
    fn test_removing_absent_entry_is_noop() {
        let manager = SuspendDialogManager::new();
        let revision = *manager.subscribe().borrow();

        assert!(!manager.state.remove(EntryId::new()));
        manager.cancel_all();

        assert_eq!(*manager.subscribe().borrow(), revision);
        assert!(manager.is_empty());
    }
}
