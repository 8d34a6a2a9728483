//! The per-document sync pass.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::reconcile::Reconciler;
use crate::remote::RemoteStore;
use draftdb_model::{ChapterRecord, DocumentRecord, Entity, EntityId, EntityKind, ParagraphRecord};
use draftdb_store::EditorStore;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a sync pass request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// A pass for this orchestrator was already in flight; the request
    /// was a no-op.
    AlreadyRunning,
    /// The pass ran to completion.
    Completed(PassReport),
}

/// What a completed pass did, per dispatch category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Entities successfully sent as creates or updates.
    pub dispatched: u32,
    /// Temporary-id entities rewritten to permanent ids.
    pub reconciled: u32,
    /// Tombstones whose remote delete was confirmed and purged.
    pub deleted: u32,
    /// Entities excluded because their required content was blank.
    pub skipped: u32,
    /// Entities held back for the next pass (failed parent, stale
    /// temporary parent reference).
    pub deferred: u32,
    /// Dispatches that failed; the entities stay unsynced.
    pub failed: u32,
}

impl PassReport {
    /// Returns true if the pass left nothing behind for a retry.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.deferred == 0
    }
}

/// Cumulative counters across passes.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Completed passes.
    pub passes_completed: u64,
    /// Entities dispatched across all passes.
    pub entities_dispatched: u64,
    /// Failed dispatches across all passes.
    pub dispatch_failures: u64,
    /// Message of the most recent failure, if any.
    pub last_error: Option<String>,
}

/// Resets the in-flight flag when a pass ends, including when the
/// pass future is dropped mid-flight.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs sync passes for one document against a remote store.
///
/// A pass collects everything unsynced for the document, then
/// dispatches sequentially: the document update first, then chapters,
/// then paragraphs. Chapters go before paragraphs because a paragraph
/// must never be sent while its chapter's id is still temporary; a
/// chapter that fails to dispatch short-circuits its paragraphs for
/// the rest of the pass. Retries are unbounded: whatever a pass leaves
/// unsynced is picked up by the next trigger.
///
/// Only one pass may run at a time; a second request while one is in
/// flight returns [`PassOutcome::AlreadyRunning`].
pub struct SyncOrchestrator<R: RemoteStore> {
    store: EditorStore,
    remote: Arc<R>,
    reconciler: Reconciler,
    config: SyncConfig,
    in_flight: AtomicBool,
    stats: RwLock<SyncStats>,
}

impl<R: RemoteStore> SyncOrchestrator<R> {
    /// Creates an orchestrator over the given store and remote client.
    pub fn new(store: EditorStore, remote: Arc<R>, config: SyncConfig) -> Self {
        let reconciler = Reconciler::new(store.clone());
        Self {
            store,
            remote,
            reconciler,
            config,
            in_flight: AtomicBool::new(false),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Cumulative counters across passes.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Runs a sync pass for `document_id`.
    ///
    /// # Errors
    ///
    /// Only local store failures abort a pass; remote failures are
    /// absorbed into the report and retried on the next trigger.
    pub async fn sync_pass(&self, document_id: &EntityId) -> SyncResult<PassOutcome> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!(document = %document_id, "sync pass already in flight");
            return Ok(PassOutcome::AlreadyRunning);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let report = self.run_pass(document_id).await?;

        let mut stats = self.stats.write();
        stats.passes_completed += 1;
        stats.entities_dispatched += u64::from(report.dispatched + report.deleted);
        stats.dispatch_failures += u64::from(report.failed);
        if report.failed == 0 {
            stats.last_error = None;
        }
        drop(stats);

        tracing::info!(document = %document_id, ?report, "sync pass completed");
        Ok(PassOutcome::Completed(report))
    }

    async fn run_pass(&self, document_id: &EntityId) -> SyncResult<PassReport> {
        // Let pending local writes settle so the pass never reads
        // stale entity state.
        self.store.drain()?;

        let set = self.store.unsynced_for_document(document_id)?;
        let mut report = PassReport::default();
        if set.is_empty() {
            return Ok(report);
        }

        // Document metadata goes out first.
        if let Some(mut document) = set.document {
            if !document.has_content() {
                report.skipped += 1;
            } else {
                let record = DocumentRecord::from(&document);
                match self.call(self.remote.update_document(&document.id, &record)).await {
                    Ok(()) => {
                        self.reconciler.confirm_update(&mut document)?;
                        report.dispatched += 1;
                    }
                    Err(error) => self.note_failure(&mut report, document.id(), &error),
                }
            }
        }

        let mut pending = set.paragraphs;
        // Chapters whose dispatch failed this pass; their paragraphs
        // are held back rather than sent against an unconfirmed state.
        let mut blocked: Vec<EntityId> = Vec::new();

        for mut chapter in set.chapters {
            if chapter.is_deleted() {
                match self.call(self.remote.delete(EntityKind::Chapter, &chapter.id)).await {
                    Ok(()) => {
                        self.reconciler.confirm_delete(EntityKind::Chapter, &chapter.id)?;
                        report.deleted += 1;
                    }
                    Err(error) => self.note_failure(&mut report, chapter.id(), &error),
                }
                continue;
            }
            if !chapter.has_content() {
                report.skipped += 1;
                continue;
            }

            let record = ChapterRecord::from(&chapter);
            let outcome = if chapter.id.is_temp() {
                match self.call(self.remote.create_chapter(&record)).await {
                    Ok(created) => {
                        self.reconciler
                            .reconcile_chapter(&mut chapter, &created.id, &mut pending)?;
                        report.reconciled += 1;
                        Ok(())
                    }
                    Err(error) => Err(error),
                }
            } else {
                match self.call(self.remote.update_chapter(&chapter.id, &record)).await {
                    Ok(()) => self.reconciler.confirm_update(&mut chapter),
                    Err(error) => Err(error),
                }
            };

            match outcome {
                Ok(()) => report.dispatched += 1,
                Err(error @ SyncError::Store(_)) => return Err(error),
                Err(error) => {
                    self.note_failure(&mut report, chapter.id(), &error);
                    blocked.push(chapter.id.clone());
                }
            }
        }

        for mut paragraph in pending {
            if blocked.contains(&paragraph.chapter_id) {
                report.deferred += 1;
                continue;
            }
            if paragraph.is_deleted() {
                match self
                    .call(self.remote.delete(EntityKind::Paragraph, &paragraph.id))
                    .await
                {
                    Ok(()) => {
                        self.reconciler
                            .confirm_delete(EntityKind::Paragraph, &paragraph.id)?;
                        report.deleted += 1;
                    }
                    Err(error) => self.note_failure(&mut report, paragraph.id(), &error),
                }
                continue;
            }
            if !paragraph.has_content() {
                report.skipped += 1;
                continue;
            }
            if paragraph.chapter_id.is_temp() {
                // Pass ordering should have reconciled the chapter
                // before any of its paragraphs came up. Defer rather
                // than dispatch a stale reference.
                let error = SyncError::ReferentialInconsistency {
                    entity: paragraph.id.clone(),
                    parent: paragraph.chapter_id.clone(),
                };
                tracing::error!(%error, "deferring paragraph with stale parent reference");
                report.deferred += 1;
                continue;
            }

            let record = ParagraphRecord::from(&paragraph);
            let outcome = if paragraph.id.is_temp() {
                match self.call(self.remote.create_paragraph(&record)).await {
                    Ok(created) => {
                        self.reconciler.reconcile_paragraph(&mut paragraph, &created.id)?;
                        report.reconciled += 1;
                        Ok(())
                    }
                    Err(error) => Err(error),
                }
            } else {
                match self.call(self.remote.update_paragraph(&paragraph.id, &record)).await {
                    Ok(()) => self.reconciler.confirm_update(&mut paragraph),
                    Err(error) => Err(error),
                }
            };

            match outcome {
                Ok(()) => report.dispatched += 1,
                Err(error @ SyncError::Store(_)) => return Err(error),
                Err(error) => self.note_failure(&mut report, paragraph.id(), &error),
            }
        }

        Ok(report)
    }

    /// Wraps a remote call in the configured request timeout.
    async fn call<T>(&self, request: impl Future<Output = SyncResult<T>>) -> SyncResult<T> {
        tokio::time::timeout(self.config.request_timeout, request)
            .await
            .map_err(|_| SyncError::Timeout)?
    }

    fn note_failure(&self, report: &mut PassReport, entity: &EntityId, error: &SyncError) {
        tracing::warn!(%entity, %error, "dispatch failed; entity stays unsynced");
        report.failed += 1;
        self.stats.write().last_error = Some(error.to_string());
    }
}

impl<R: RemoteStore> std::fmt::Debug for SyncOrchestrator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MockRemote;
    use draftdb_model::{Chapter, Document};

    fn orchestrator() -> (EditorStore, Arc<MockRemote>, SyncOrchestrator<MockRemote>) {
        let store = EditorStore::in_memory();
        let remote = Arc::new(MockRemote::new());
        let orchestrator =
            SyncOrchestrator::new(store.clone(), Arc::clone(&remote), SyncConfig::default());
        (store, remote, orchestrator)
    }

    #[tokio::test]
    async fn empty_pass_is_clean() {
        let (store, remote, orchestrator) = orchestrator();
        let doc = Document::new(EntityId::new("doc-1"), "Draft");
        store.put(&doc).unwrap();

        let outcome = orchestrator.sync_pass(&doc.id).await.unwrap();
        let PassOutcome::Completed(report) = outcome else {
            panic!("expected a completed pass");
        };
        assert!(report.is_clean());
        assert_eq!(report.dispatched, 0);
        assert!(remote.requests().is_empty());
    }

    #[tokio::test]
    async fn document_update_is_dispatched_before_chapters() {
        let (store, remote, orchestrator) = orchestrator();
        let mut doc = Document::new(EntityId::new("doc-1"), "Draft");
        doc.touch();
        store.put(&doc).unwrap();
        let mut chapter = Chapter::new(doc.id.clone(), 0);
        chapter.title = "One".into();
        store.put(&chapter).unwrap();

        orchestrator.sync_pass(&doc.id).await.unwrap();

        let requests = remote.requests();
        assert!(matches!(
            requests[0],
            crate::remote::RemoteRequest::UpdateDocument { .. }
        ));
        assert!(matches!(
            requests[1],
            crate::remote::RemoteRequest::CreateChapter { .. }
        ));
    }

    #[tokio::test]
    async fn stats_accumulate_across_passes() {
        let (store, _remote, orchestrator) = orchestrator();
        let doc = Document::new(EntityId::new("doc-1"), "Draft");
        store.put(&doc).unwrap();
        let mut chapter = Chapter::new(doc.id.clone(), 0);
        chapter.title = "One".into();
        store.put(&chapter).unwrap();

        orchestrator.sync_pass(&doc.id).await.unwrap();
        orchestrator.sync_pass(&doc.id).await.unwrap();

        let stats = orchestrator.stats();
        assert_eq!(stats.passes_completed, 2);
        assert_eq!(stats.entities_dispatched, 1);
        assert!(stats.last_error.is_none());
    }
}
