//! Remote store client boundary.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use draftdb_model::{
    ChapterRecord, CreatedRecord, DocumentRecord, EntityId, EntityKind, ParagraphRecord,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;

/// Client for the remote document store.
///
/// Implemented externally (HTTP in production, [`MockRemote`] in
/// tests). Creates return the remote-assigned permanent id; the
/// payload records never carry an entity id, so a temporary id can
/// never leak over the wire.
///
/// No idempotency key is used: a create retried after a dropped
/// response can duplicate the remote entity. Documented as a known
/// risk; callers retry updates and deletes freely but should only
/// retry a create on the next full pass.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Creates a chapter remotely, returning its permanent id.
    async fn create_chapter(&self, record: &ChapterRecord) -> SyncResult<CreatedRecord>;

    /// Updates the chapter stored under `id`.
    async fn update_chapter(&self, id: &EntityId, record: &ChapterRecord) -> SyncResult<()>;

    /// Creates a paragraph remotely, returning its permanent id.
    async fn create_paragraph(&self, record: &ParagraphRecord) -> SyncResult<CreatedRecord>;

    /// Updates the paragraph stored under `id`.
    async fn update_paragraph(&self, id: &EntityId, record: &ParagraphRecord) -> SyncResult<()>;

    /// Updates the document stored under `id`. Documents are created
    /// server-side, so there is no create call.
    async fn update_document(&self, id: &EntityId, record: &DocumentRecord) -> SyncResult<()>;

    /// Deletes the entity of `kind` stored under `id`.
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> SyncResult<()>;
}

/// One request as seen by [`MockRemote`], including every id the
/// request transmitted so tests can assert none was temporary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRequest {
    /// Chapter create with its parent document id and title.
    CreateChapter {
        /// Transmitted parent document id.
        document_id: EntityId,
        /// Chapter title, used as the failure-scripting key.
        title: String,
    },
    /// Chapter update.
    UpdateChapter {
        /// Addressed chapter id.
        id: EntityId,
    },
    /// Paragraph create with its parent references and text.
    CreateParagraph {
        /// Transmitted parent document id.
        document_id: EntityId,
        /// Transmitted parent chapter id.
        chapter_id: EntityId,
        /// Paragraph text, used as the failure-scripting key.
        text: String,
    },
    /// Paragraph update.
    UpdateParagraph {
        /// Addressed paragraph id.
        id: EntityId,
    },
    /// Document update.
    UpdateDocument {
        /// Addressed document id.
        id: EntityId,
    },
    /// Entity delete.
    Delete {
        /// Entity kind.
        kind: EntityKind,
        /// Addressed entity id.
        id: EntityId,
    },
}

impl RemoteRequest {
    /// Every id this request transmitted, addressed or embedded.
    pub fn transmitted_ids(&self) -> Vec<&EntityId> {
        match self {
            RemoteRequest::CreateChapter { document_id, .. } => vec![document_id],
            RemoteRequest::CreateParagraph {
                document_id,
                chapter_id,
                ..
            } => vec![document_id, chapter_id],
            RemoteRequest::UpdateChapter { id }
            | RemoteRequest::UpdateParagraph { id }
            | RemoteRequest::UpdateDocument { id }
            | RemoteRequest::Delete { id, .. } => vec![id],
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    failures: HashSet<String>,
    requests: Vec<RemoteRequest>,
}

/// An in-memory remote store for tests.
///
/// Assigns sequential permanent ids, records every request, and fails
/// any request whose scripting key (chapter title, paragraph text, or
/// addressed id) was registered with [`MockRemote::fail_on`].
#[derive(Debug, Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
    latency: Option<Duration>,
}

impl MockRemote {
    /// Creates a mock remote that succeeds every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artificial delay before every response.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Scripts a failure: any request keyed by `key` returns a
    /// retryable remote error.
    pub fn fail_on(&self, key: impl Into<String>) {
        self.state.lock().failures.insert(key.into());
    }

    /// Clears a scripted failure.
    pub fn recover(&self, key: &str) {
        self.state.lock().failures.remove(key);
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.state.lock().requests.clone()
    }

    /// Ids transmitted across all requests so far.
    pub fn transmitted_ids(&self) -> Vec<EntityId> {
        self.state
            .lock()
            .requests
            .iter()
            .flat_map(|r| r.transmitted_ids().into_iter().cloned())
            .collect()
    }

    async fn respond(&self, key: &str, request: RemoteRequest) -> SyncResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state.lock();
        state.requests.push(request);
        if state.failures.contains(key) {
            return Err(SyncError::remote_retryable("simulated network error"));
        }
        Ok(())
    }

    fn mint_id(&self, prefix: &str) -> EntityId {
        let mut state = self.state.lock();
        state.next_id += 1;
        EntityId::new(format!("{prefix}-{}", state.next_id))
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn create_chapter(&self, record: &ChapterRecord) -> SyncResult<CreatedRecord> {
        self.respond(
            &record.title,
            RemoteRequest::CreateChapter {
                document_id: record.document_id.clone(),
                title: record.title.clone(),
            },
        )
        .await?;
        Ok(CreatedRecord::new(self.mint_id("remote-ch")))
    }

    async fn update_chapter(&self, id: &EntityId, _record: &ChapterRecord) -> SyncResult<()> {
        self.respond(
            id.as_str(),
            RemoteRequest::UpdateChapter { id: id.clone() },
        )
        .await
    }

    async fn create_paragraph(&self, record: &ParagraphRecord) -> SyncResult<CreatedRecord> {
        self.respond(
            &record.text,
            RemoteRequest::CreateParagraph {
                document_id: record.document_id.clone(),
                chapter_id: record.chapter_id.clone(),
                text: record.text.clone(),
            },
        )
        .await?;
        Ok(CreatedRecord::new(self.mint_id("remote-p")))
    }

    async fn update_paragraph(&self, id: &EntityId, _record: &ParagraphRecord) -> SyncResult<()> {
        self.respond(
            id.as_str(),
            RemoteRequest::UpdateParagraph { id: id.clone() },
        )
        .await
    }

    async fn update_document(&self, id: &EntityId, _record: &DocumentRecord) -> SyncResult<()> {
        self.respond(
            id.as_str(),
            RemoteRequest::UpdateDocument { id: id.clone() },
        )
        .await
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> SyncResult<()> {
        self.respond(id.as_str(), RemoteRequest::Delete {
            kind,
            id: id.clone(),
        })
        .await
    }
}
