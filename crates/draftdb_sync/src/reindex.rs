//! Sibling index maintenance.
//!
//! After an insert, delete or reorder within a sibling collection, the
//! surviving siblings must carry contiguous 0-based indices. Only the
//! siblings whose index actually changed are rewritten and marked
//! unsynced, keeping the write volume minimal.

use crate::error::SyncResult;
use draftdb_model::{Chapter, Entity, EntityId, Ordered, Paragraph};
use draftdb_store::EditorStore;

/// Recomputes contiguous 0-based indices over an ordered sibling
/// slice. Tombstoned siblings are skipped and keep their stale index.
///
/// Siblings whose index changed are marked unsynced in place; their
/// ids are returned so the caller can persist exactly that set.
pub fn assign_indices<T: Ordered>(siblings: &mut [T]) -> Vec<EntityId> {
    let mut next = 0u32;
    let mut changed = Vec::new();
    for sibling in siblings.iter_mut() {
        if sibling.is_deleted() {
            continue;
        }
        if sibling.order_index() != next {
            sibling.set_order_index(next);
            sibling.set_synced(false);
            changed.push(sibling.id().clone());
        }
        next += 1;
    }
    changed
}

/// Store-backed reindexing over chapter and paragraph collections.
///
/// Works through an injected [`EditorStore`] handle; there is no
/// ambient store state.
#[derive(Debug, Clone)]
pub struct Reindexer {
    store: EditorStore,
}

impl Reindexer {
    /// Creates a reindexer over the given store.
    pub fn new(store: EditorStore) -> Self {
        Self { store }
    }

    fn reindex<T: Ordered>(&self, parent_id: &EntityId) -> SyncResult<usize> {
        let mut siblings: Vec<T> = self.store.by_parent(parent_id)?;
        let changed = assign_indices(&mut siblings);
        for sibling in &siblings {
            if changed.contains(sibling.id()) {
                self.store.put(sibling)?;
            }
        }
        Ok(changed.len())
    }

    /// Renumbers the chapters of a document. Returns how many chapters
    /// were rewritten.
    pub fn reindex_chapters(&self, document_id: &EntityId) -> SyncResult<usize> {
        self.reindex::<Chapter>(document_id)
    }

    /// Renumbers the paragraphs of a chapter. Returns how many
    /// paragraphs were rewritten.
    pub fn reindex_paragraphs(&self, chapter_id: &EntityId) -> SyncResult<usize> {
        self.reindex::<Paragraph>(chapter_id)
    }

    /// Inserts an entity among its live siblings at `position`
    /// (clamped to the end), shifting later siblings up.
    ///
    /// `exclude` drops a sibling from consideration, used when an
    /// existing entity is being re-homed rather than newly created.
    fn insert_at<T: Ordered>(
        &self,
        parent_id: &EntityId,
        entity: T,
        position: usize,
        exclude: Option<&EntityId>,
    ) -> SyncResult<T> {
        let mut live: Vec<T> = self
            .store
            .by_parent(parent_id)?
            .into_iter()
            .filter(|s: &T| !s.is_deleted() && Some(s.id()) != exclude)
            .collect();
        let slot = position.min(live.len());
        live.insert(slot, entity);

        let changed = assign_indices(&mut live);
        for sibling in &live {
            if changed.contains(sibling.id()) {
                self.store.put(sibling)?;
            }
        }
        let inserted = live.swap_remove(slot);
        self.store.put(&inserted)?;
        Ok(inserted)
    }

    /// Inserts a chapter into its document at `position` and renumbers
    /// the document's chapters.
    pub fn insert_chapter(&self, chapter: Chapter, position: usize) -> SyncResult<Chapter> {
        let document_id = chapter.document_id.clone();
        self.insert_at(&document_id, chapter, position, None)
    }

    /// Inserts a paragraph into its chapter at `position` and
    /// renumbers the chapter's paragraphs.
    pub fn insert_paragraph(&self, paragraph: Paragraph, position: usize) -> SyncResult<Paragraph> {
        let chapter_id = paragraph.chapter_id.clone();
        self.insert_at(&chapter_id, paragraph, position, None)
    }

    /// Removes a paragraph through the store's delete lifecycle and
    /// closes the index gap it leaves behind.
    pub fn remove_paragraph(&self, paragraph: &Paragraph) -> SyncResult<usize> {
        self.store.remove_paragraph(paragraph)?;
        self.reindex_paragraphs(&paragraph.chapter_id)
    }

    /// Removes a chapter (cascading to its paragraphs) and closes the
    /// index gap among the document's chapters.
    pub fn remove_chapter(&self, chapter: &Chapter) -> SyncResult<usize> {
        self.store.remove_chapter(chapter)?;
        self.reindex_chapters(&chapter.document_id)
    }

    /// Moves a paragraph to `position` inside `destination_chapter`,
    /// updating its parent reference, renumbering the destination and
    /// closing the gap in the source chapter. Also handles a reorder
    /// within the same chapter.
    pub fn move_paragraph(
        &self,
        paragraph: &Paragraph,
        destination_chapter: &EntityId,
        position: usize,
    ) -> SyncResult<Paragraph> {
        let source_chapter = paragraph.chapter_id.clone();
        let mut moved = paragraph.clone();
        moved.chapter_id = destination_chapter.clone();
        moved.touch();

        let moved = self.insert_at(destination_chapter, moved, position, Some(&paragraph.id))?;
        if source_chapter != *destination_chapter {
            self.reindex_paragraphs(&source_chapter)?;
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store() -> EditorStore {
        EditorStore::in_memory()
    }

    fn paragraph(chapter_id: &EntityId, index: u32, text: &str) -> Paragraph {
        let mut p = Paragraph::new(EntityId::new("doc-1"), chapter_id.clone(), index);
        p.set_text(text);
        p
    }

    fn texts_in_order(store: &EditorStore, chapter_id: &EntityId) -> Vec<String> {
        store
            .paragraphs_of_chapter(chapter_id)
            .unwrap()
            .into_iter()
            .filter(|p| !p.is_deleted())
            .map(|p| p.text)
            .collect()
    }

    #[test]
    fn deleting_the_middle_sibling_closes_the_gap() {
        let store = store();
        let ch = EntityId::new("ch-1");
        let first = paragraph(&ch, 0, "a");
        let second = paragraph(&ch, 1, "b");
        let third = paragraph(&ch, 2, "c");
        for p in [&first, &second, &third] {
            store.put(p).unwrap();
        }

        let reindexer = Reindexer::new(store.clone());
        reindexer.remove_paragraph(&second).unwrap();

        let remaining: Vec<(String, u32)> = store
            .paragraphs_of_chapter(&ch)
            .unwrap()
            .into_iter()
            .map(|p| (p.text, p.index))
            .collect();
        assert_eq!(remaining, [("a".into(), 0), ("c".into(), 1)]);
    }

    #[test]
    fn untouched_siblings_keep_their_sync_state() {
        let store = store();
        let ch = EntityId::new("ch-1");
        let mut first = paragraph(&ch, 0, "a");
        first.id = EntityId::new("p-first");
        first.sync = true;
        let second = paragraph(&ch, 1, "b");
        let mut third = paragraph(&ch, 2, "c");
        third.id = EntityId::new("p-third");
        third.sync = true;
        for p in [&first, &second, &third] {
            store.put(p).unwrap();
        }

        let reindexer = Reindexer::new(store.clone());
        let rewritten = reindexer.remove_paragraph(&second).unwrap();
        assert_eq!(rewritten, 1);

        // Only the shifted sibling lost its synced state.
        let first: Paragraph = store.get(&first.id).unwrap().unwrap();
        assert!(first.sync);
        let third: Paragraph = store.get(&third.id).unwrap().unwrap();
        assert!(!third.sync);
        assert_eq!(third.index, 1);
    }

    #[test]
    fn tombstones_are_skipped_when_renumbering() {
        let mut siblings = vec![
            paragraph(&EntityId::new("ch-1"), 3, "a"),
            paragraph(&EntityId::new("ch-1"), 4, "dead"),
            paragraph(&EntityId::new("ch-1"), 5, "b"),
        ];
        siblings[1].set_deleted(true);

        let changed = assign_indices(&mut siblings);
        assert_eq!(changed.len(), 2);
        assert_eq!(siblings[0].index, 0);
        assert_eq!(siblings[1].index, 4);
        assert_eq!(siblings[2].index, 1);
    }

    #[test]
    fn insert_shifts_later_siblings() {
        let store = store();
        let ch = EntityId::new("ch-1");
        store.put(&paragraph(&ch, 0, "a")).unwrap();
        store.put(&paragraph(&ch, 1, "c")).unwrap();

        let reindexer = Reindexer::new(store.clone());
        let inserted = reindexer
            .insert_paragraph(paragraph(&ch, 0, "b"), 1)
            .unwrap();
        assert_eq!(inserted.index, 1);
        assert_eq!(texts_in_order(&store, &ch), ["a", "b", "c"]);
    }

    #[test]
    fn insert_position_is_clamped() {
        let store = store();
        let ch = EntityId::new("ch-1");
        store.put(&paragraph(&ch, 0, "a")).unwrap();

        let reindexer = Reindexer::new(store.clone());
        let inserted = reindexer
            .insert_paragraph(paragraph(&ch, 0, "z"), 99)
            .unwrap();
        assert_eq!(inserted.index, 1);
    }

    #[test]
    fn move_across_chapters_renumbers_both_sides() {
        let store = store();
        let source = EntityId::new("ch-1");
        let destination = EntityId::new("ch-2");
        let a = paragraph(&source, 0, "a");
        let b = paragraph(&source, 1, "b");
        let x = paragraph(&destination, 0, "x");
        for p in [&a, &b, &x] {
            store.put(p).unwrap();
        }

        let reindexer = Reindexer::new(store.clone());
        let moved = reindexer.move_paragraph(&a, &destination, 0).unwrap();
        assert_eq!(moved.chapter_id, destination);
        assert_eq!(moved.index, 0);
        assert!(!moved.sync);

        assert_eq!(texts_in_order(&store, &source), ["b"]);
        assert_eq!(texts_in_order(&store, &destination), ["a", "x"]);

        let b: Paragraph = store.get(&b.id).unwrap().unwrap();
        assert_eq!(b.index, 0);
    }

    #[test]
    fn reorder_within_a_chapter() {
        let store = store();
        let ch = EntityId::new("ch-1");
        let a = paragraph(&ch, 0, "a");
        let b = paragraph(&ch, 1, "b");
        let c = paragraph(&ch, 2, "c");
        for p in [&a, &b, &c] {
            store.put(p).unwrap();
        }

        let reindexer = Reindexer::new(store.clone());
        reindexer.move_paragraph(&a, &ch, 2).unwrap();
        assert_eq!(texts_in_order(&store, &ch), ["b", "c", "a"]);
    }

    proptest! {
        #[test]
        fn live_indices_are_a_contiguous_range(
            starts in proptest::collection::vec(0u32..50, 0..12),
            dead in proptest::collection::vec(any::<bool>(), 0..12),
        ) {
            let ch = EntityId::new("ch-1");
            let mut siblings: Vec<Paragraph> = starts
                .iter()
                .enumerate()
                .map(|(i, &start)| {
                    let mut p = paragraph(&ch, start, "t");
                    if dead.get(i).copied().unwrap_or(false) {
                        p.set_deleted(true);
                    }
                    p
                })
                .collect();

            assign_indices(&mut siblings);

            let live: Vec<u32> = siblings
                .iter()
                .filter(|p| !p.is_deleted())
                .map(|p| p.index)
                .collect();
            let expected: Vec<u32> = (0..live.len() as u32).collect();
            prop_assert_eq!(live, expected);
        }
    }
}
