//! Temporary-id reconciliation.
//!
//! When the remote store confirms a create, the entity trades its
//! temporary id for the remote-assigned permanent one. The rewrite has
//! to be atomic in effect: the entity is re-keyed in the local store,
//! the stale temporary record removed, and every dependent that still
//! references the temporary id is retargeted before it can be
//! dispatched.

use crate::error::SyncResult;
use draftdb_model::{Chapter, Entity, EntityId, EntityKind, Paragraph};
use draftdb_store::EditorStore;

/// Performs temporary-to-permanent id rewrites against an injected
/// store handle.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: EditorStore,
}

impl Reconciler {
    /// Creates a reconciler over the given store.
    pub fn new(store: EditorStore) -> Self {
        Self { store }
    }

    /// Re-keys `entity` from its current id to `new_id`, recording the
    /// old id in `previous_id`, persisting under the new id, removing
    /// the stale record and marking the entity synced.
    ///
    /// Returns the replaced id when a rewrite actually happened.
    /// Idempotent: reapplying the same rewrite is a no-op beyond
    /// re-asserting the synced state.
    fn rekey<T: Entity>(&self, entity: &mut T, new_id: &EntityId) -> SyncResult<Option<EntityId>> {
        let replaced = if entity.id() != new_id {
            let previous = entity.id().clone();
            entity.set_id(new_id.clone());
            entity.set_previous_id(Some(previous.clone()));
            Some(previous)
        } else {
            None
        };
        entity.set_synced(true);
        self.store.put(entity)?;

        if let Some(previous) = &replaced {
            self.store.purge(T::KIND, previous)?;
        }
        Ok(replaced)
    }

    /// Reconciles a confirmed chapter create.
    ///
    /// Rewrites the chapter to `new_id`, then retargets its dependents:
    /// paragraphs in the local store that still reference the old id
    /// are rewritten and persisted, and paragraphs queued for dispatch
    /// in the running pass (`in_flight`) are rewritten in place so they
    /// go out carrying the permanent parent id.
    pub fn reconcile_chapter(
        &self,
        chapter: &mut Chapter,
        new_id: &EntityId,
        in_flight: &mut [Paragraph],
    ) -> SyncResult<()> {
        let Some(previous) = self.rekey(chapter, new_id)? else {
            return Ok(());
        };
        tracing::debug!(previous = %previous, new = %new_id, "chapter reconciled");

        for mut paragraph in self.store.paragraphs_of_chapter(&previous)? {
            // A paragraph under an unconfirmed chapter is necessarily
            // unsynced already, so no extra mark is needed.
            paragraph.chapter_id = new_id.clone();
            self.store.put(&paragraph)?;
        }

        for paragraph in in_flight.iter_mut() {
            if paragraph.chapter_id == previous {
                paragraph.chapter_id = new_id.clone();
            }
        }
        Ok(())
    }

    /// Reconciles a confirmed paragraph create. Paragraphs have no
    /// dependents, so this is the plain rewrite.
    pub fn reconcile_paragraph(
        &self,
        paragraph: &mut Paragraph,
        new_id: &EntityId,
    ) -> SyncResult<()> {
        if let Some(previous) = self.rekey(paragraph, new_id)? {
            tracing::debug!(previous = %previous, new = %new_id, "paragraph reconciled");
        }
        Ok(())
    }

    /// Marks a successfully updated entity as confirmed.
    pub fn confirm_update<T: Entity>(&self, entity: &mut T) -> SyncResult<()> {
        entity.set_synced(true);
        self.store.put(entity)?;
        Ok(())
    }

    /// Purges a tombstone once its remote delete is confirmed.
    pub fn confirm_delete(&self, kind: EntityKind, id: &EntityId) -> SyncResult<()> {
        self.store.purge(kind, id)?;
        tracing::debug!(%id, %kind, "tombstone purged after confirmed delete");
        Ok(())
    }
}
