//! Typed store layer shared by the editor and the sync engine.

use crate::backend::{RawRecord, StoreBackend};
use crate::error::StoreResult;
use draftdb_model::{Chapter, Document, Entity, EntityId, EntityKind, Ordered, Paragraph};
use std::collections::HashMap;
use std::sync::Arc;

/// All unsynced, per-document state the sync orchestrator works from.
#[derive(Debug, Clone, Default)]
pub struct UnsyncedSet {
    /// The document itself, if it has unconfirmed local changes.
    pub document: Option<Document>,
    /// Unsynced chapters of the document, ordered by sibling index.
    pub chapters: Vec<Chapter>,
    /// Unsynced paragraphs across all the document's chapters, ordered
    /// by chapter then sibling index.
    pub paragraphs: Vec<Paragraph>,
}

impl UnsyncedSet {
    /// Returns true if nothing needs syncing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_none() && self.chapters.is_empty() && self.paragraphs.is_empty()
    }
}

/// Typed convenience layer over a [`StoreBackend`].
///
/// The `EditorStore` is where entities are serialized to and from raw
/// records; the backend never interprets payloads. Both the UI
/// mutation path and the sync orchestrator go through this handle -
/// it is injected, never ambient.
#[derive(Clone)]
pub struct EditorStore {
    backend: Arc<dyn StoreBackend>,
}

impl EditorStore {
    /// Creates a store over the given backend.
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Creates a store over a fresh in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::MemoryBackend::new()))
    }

    fn to_raw<T: Entity>(entity: &T) -> StoreResult<RawRecord> {
        Ok(RawRecord {
            id: entity.id().as_str().to_owned(),
            parent_id: entity.parent_id().map(|p| p.as_str().to_owned()),
            payload: serde_json::to_value(entity)?,
        })
    }

    /// Upserts an entity under its current id.
    pub fn put<T: Entity>(&self, entity: &T) -> StoreResult<()> {
        self.backend.put(T::KIND, Self::to_raw(entity)?)
    }

    /// Gets an entity by id.
    pub fn get<T: Entity>(&self, id: &EntityId) -> StoreResult<Option<T>> {
        match self.backend.get(T::KIND, id.as_str())? {
            Some(record) => Ok(Some(serde_json::from_value(record.payload)?)),
            None => Ok(None),
        }
    }

    /// Returns all entities of a kind.
    pub fn get_all<T: Entity>(&self) -> StoreResult<Vec<T>> {
        self.backend
            .get_all(T::KIND)?
            .into_iter()
            .map(|r| serde_json::from_value(r.payload).map_err(Into::into))
            .collect()
    }

    /// Returns all entities under the given parent, ordered by sibling
    /// index.
    pub fn by_parent<T: Ordered>(&self, parent_id: &EntityId) -> StoreResult<Vec<T>> {
        let mut entities: Vec<T> = self
            .backend
            .get_by_parent(T::KIND, parent_id.as_str())?
            .into_iter()
            .map(|r| serde_json::from_value(r.payload).map_err(Into::into))
            .collect::<StoreResult<_>>()?;
        entities.sort_by_key(Ordered::order_index);
        Ok(entities)
    }

    /// Chapters of a document, ordered by sibling index.
    pub fn chapters_of(&self, document_id: &EntityId) -> StoreResult<Vec<Chapter>> {
        self.by_parent(document_id)
    }

    /// Paragraphs of a chapter, ordered by sibling index.
    pub fn paragraphs_of_chapter(&self, chapter_id: &EntityId) -> StoreResult<Vec<Paragraph>> {
        self.by_parent(chapter_id)
    }

    /// Removes a record outright, bypassing the tombstone lifecycle.
    ///
    /// Used for temporary-id purges and for dropping a tombstone once
    /// the remote delete is confirmed.
    pub fn purge(&self, kind: EntityKind, id: &EntityId) -> StoreResult<bool> {
        self.backend.delete(kind, id.as_str())
    }

    /// Removes a paragraph through the delete lifecycle: a temporary
    /// id is purged immediately (the remote never saw it); a permanent
    /// id is tombstoned until the remote delete is confirmed.
    pub fn remove_paragraph(&self, paragraph: &Paragraph) -> StoreResult<()> {
        if paragraph.id.is_temp() {
            self.purge(EntityKind::Paragraph, &paragraph.id)?;
            return Ok(());
        }
        let mut tombstone = paragraph.clone();
        tombstone.set_deleted(true);
        tombstone.set_synced(false);
        self.put(&tombstone)
    }

    /// Removes a chapter through the delete lifecycle, cascading to
    /// its paragraphs so no paragraph is left naming a purged parent.
    pub fn remove_chapter(&self, chapter: &Chapter) -> StoreResult<()> {
        for paragraph in self.paragraphs_of_chapter(&chapter.id)? {
            self.remove_paragraph(&paragraph)?;
        }
        if chapter.id.is_temp() {
            self.purge(EntityKind::Chapter, &chapter.id)?;
            return Ok(());
        }
        let mut tombstone = chapter.clone();
        tombstone.set_deleted(true);
        tombstone.set_synced(false);
        self.put(&tombstone)
    }

    /// Collects everything unsynced for a document: the document
    /// record itself plus chapters and paragraphs with `sync == false`
    /// (tombstones included - they are pending remote deletes).
    ///
    /// Paragraphs are collected by their `document_id`, not by walking
    /// the chapter records: a paragraph tombstone must stay visible
    /// even after its chapter's own tombstone has been confirmed and
    /// purged.
    pub fn unsynced_for_document(&self, document_id: &EntityId) -> StoreResult<UnsyncedSet> {
        let document = self
            .get::<Document>(document_id)?
            .filter(|d| !d.is_synced());

        let all_chapters = self.chapters_of(document_id)?;
        let chapters: Vec<Chapter> = all_chapters
            .iter()
            .filter(|c| !c.is_synced())
            .cloned()
            .collect();

        let chapter_rank: HashMap<EntityId, usize> = all_chapters
            .iter()
            .enumerate()
            .map(|(rank, c)| (c.id.clone(), rank))
            .collect();
        let mut paragraphs: Vec<Paragraph> = self
            .get_all::<Paragraph>()?
            .into_iter()
            .filter(|p| p.document_id == *document_id && !p.is_synced())
            .collect();
        // Chapter order, then sibling index; paragraphs of an already
        // purged chapter sort last.
        paragraphs.sort_by_key(|p| {
            (
                chapter_rank
                    .get(&p.chapter_id)
                    .copied()
                    .unwrap_or(usize::MAX),
                p.index,
            )
        });

        Ok(UnsyncedSet {
            document,
            chapters,
            paragraphs,
        })
    }

    /// Waits for all pending writes to settle.
    ///
    /// Callers trigger this before a sync pass so the pass never reads
    /// stale data.
    pub fn drain(&self) -> StoreResult<()> {
        self.backend.flush()
    }
}

impl std::fmt::Debug for EditorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorStore").finish_non_exhaustive()
    }
}
