//! Sync triggers: debounce, connectivity, and explicit requests.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::orchestrator::{PassOutcome, SyncOrchestrator};
use crate::remote::RemoteStore;
use draftdb_model::EntityId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Remote reachability as reported by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Not yet determined. Treated as "do not sync yet".
    #[default]
    Unknown,
    /// The remote store is unreachable.
    Offline,
    /// The remote store is reachable.
    Online,
}

/// Decides when the orchestrator runs a pass for one document.
///
/// Three triggers start a pass: a burst of local edits settling after
/// the debounce window, a transition to [`Connectivity::Online`], and
/// an explicit [`sync_now`](SyncScheduler::sync_now). Every qualifying
/// edit cancels and restarts the debounce timer; while the user is
/// actively typing the fire is suppressed and the timer re-arms. All
/// triggers are gated on being online.
pub struct SyncScheduler<R: RemoteStore> {
    orchestrator: Arc<SyncOrchestrator<R>>,
    document_id: EntityId,
    window: Duration,
    connectivity: Mutex<Connectivity>,
    editing: AtomicBool,
    debounce: Mutex<Option<JoinHandle<()>>>,
}

impl<R: RemoteStore + 'static> SyncScheduler<R> {
    /// Creates a scheduler for one document.
    pub fn new(
        orchestrator: Arc<SyncOrchestrator<R>>,
        document_id: EntityId,
        config: &SyncConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            orchestrator,
            document_id,
            window: config.debounce_window,
            connectivity: Mutex::new(Connectivity::Unknown),
            editing: AtomicBool::new(false),
            debounce: Mutex::new(None),
        })
    }

    /// The current connectivity state.
    pub fn connectivity(&self) -> Connectivity {
        *self.connectivity.lock()
    }

    /// Registers a local edit: cancels and restarts the debounce
    /// timer. When the window elapses without further edits (and the
    /// user is not mid-keystroke), a pass is triggered.
    pub fn note_edit(self: &Arc<Self>) {
        let scheduler = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(scheduler.window).await;
                if scheduler.editing.load(Ordering::SeqCst) {
                    // Still typing: wait out another window.
                    continue;
                }
                scheduler.fire().await;
                break;
            }
        });

        let mut slot = self.debounce.lock();
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    /// Marks whether the user is actively typing in an editable
    /// region. While set, a due debounce fire re-arms instead of
    /// triggering.
    pub fn set_editing(&self, editing: bool) {
        self.editing.store(editing, Ordering::SeqCst);
    }

    /// Updates connectivity. A transition to online triggers an
    /// immediate pass to flush whatever accumulated while unreachable.
    pub fn set_connectivity(self: &Arc<Self>, connectivity: Connectivity) {
        let previous = std::mem::replace(&mut *self.connectivity.lock(), connectivity);
        if connectivity == Connectivity::Online && previous != Connectivity::Online {
            tracing::info!("connectivity restored; triggering sync pass");
            let scheduler = Arc::clone(self);
            tokio::spawn(async move {
                scheduler.fire().await;
            });
        }
    }

    /// Triggers a pass immediately, bypassing the debounce window.
    ///
    /// Returns `None` when offline or connectivity is still unknown;
    /// the pass outcome otherwise.
    pub async fn sync_now(&self) -> SyncResult<Option<PassOutcome>> {
        self.cancel();
        if self.connectivity() != Connectivity::Online {
            tracing::debug!("sync requested while not online; skipping");
            return Ok(None);
        }
        self.orchestrator
            .sync_pass(&self.document_id)
            .await
            .map(Some)
    }

    /// Cancels a pending debounce timer, if any.
    pub fn cancel(&self) {
        if let Some(task) = self.debounce.lock().take() {
            task.abort();
        }
    }

    async fn fire(&self) {
        if self.connectivity() != Connectivity::Online {
            tracing::debug!("debounce elapsed while not online; skipping pass");
            return;
        }
        if let Err(error) = self.orchestrator.sync_pass(&self.document_id).await {
            tracing::warn!(%error, "scheduled sync pass failed");
        }
    }
}

impl<R: RemoteStore> Drop for SyncScheduler<R> {
    fn drop(&mut self) {
        if let Some(task) = self.debounce.lock().take() {
            task.abort();
        }
    }
}

impl<R: RemoteStore + 'static> std::fmt::Debug for SyncScheduler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncScheduler")
            .field("document_id", &self.document_id)
            .field("connectivity", &self.connectivity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MockRemote;
    use draftdb_model::Chapter;
    use draftdb_store::EditorStore;

    fn scheduler(window: Duration) -> (EditorStore, Arc<MockRemote>, Arc<SyncScheduler<MockRemote>>) {
        let store = EditorStore::in_memory();
        let remote = Arc::new(MockRemote::new());
        let config = SyncConfig::default().with_debounce_window(window);
        let orchestrator = Arc::new(SyncOrchestrator::new(
            store.clone(),
            Arc::clone(&remote),
            config.clone(),
        ));
        let scheduler = SyncScheduler::new(orchestrator, EntityId::new("doc-1"), &config);
        (store, remote, scheduler)
    }

    fn unsynced_chapter(store: &EditorStore) {
        let mut chapter = Chapter::new(EntityId::new("doc-1"), 0);
        chapter.title = "One".into();
        store.put(&chapter).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_fires_after_the_window() {
        let (store, remote, scheduler) = scheduler(Duration::from_secs(3));
        scheduler.set_connectivity(Connectivity::Online);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let baseline = remote.requests().len();

        unsynced_chapter(&store);
        scheduler.note_edit();
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(remote.requests().len() > baseline);
    }

    #[tokio::test(start_paused = true)]
    async fn each_edit_resets_the_window() {
        let (store, remote, scheduler) = scheduler(Duration::from_secs(3));
        scheduler.set_connectivity(Connectivity::Online);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let baseline = remote.requests().len();

        unsynced_chapter(&store);
        scheduler.note_edit();
        tokio::time::sleep(Duration::from_secs(2)).await;
        scheduler.note_edit();
        tokio::time::sleep(Duration::from_secs(2)).await;
        // Neither window has fully elapsed without an edit.
        assert_eq!(remote.requests().len(), baseline);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(remote.requests().len() > baseline);
    }

    #[tokio::test(start_paused = true)]
    async fn active_typing_suppresses_the_fire() {
        let (store, remote, scheduler) = scheduler(Duration::from_secs(3));
        scheduler.set_connectivity(Connectivity::Online);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let baseline = remote.requests().len();

        unsynced_chapter(&store);
        scheduler.set_editing(true);
        scheduler.note_edit();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(remote.requests().len(), baseline);

        scheduler.set_editing(false);
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(remote.requests().len() > baseline);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_connectivity_gates_all_triggers() {
        let (store, remote, scheduler) = scheduler(Duration::from_millis(50));
        unsynced_chapter(&store);

        scheduler.note_edit();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(remote.requests().is_empty());

        assert_eq!(scheduler.sync_now().await.unwrap(), None);
        assert!(remote.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn coming_online_triggers_a_pass() {
        let (store, remote, scheduler) = scheduler(Duration::from_secs(3));
        unsynced_chapter(&store);

        scheduler.set_connectivity(Connectivity::Offline);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(remote.requests().is_empty());

        scheduler.set_connectivity(Connectivity::Online);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!remote.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sync_now_bypasses_the_debounce() {
        let (store, remote, scheduler) = scheduler(Duration::from_secs(3600));
        scheduler.set_connectivity(Connectivity::Online);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let baseline = remote.requests().len();

        unsynced_chapter(&store);
        let outcome = scheduler.sync_now().await.unwrap();
        assert!(matches!(outcome, Some(PassOutcome::Completed(_))));
        assert!(remote.requests().len() > baseline);
    }
}
