//! In-memory store backend for testing.

use crate::backend::{RawRecord, StoreBackend};
use crate::error::StoreResult;
use draftdb_model::EntityKind;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// An in-memory store backend.
///
/// Stores all namespaces in memory. Suitable for unit tests,
/// integration tests and ephemeral documents that don't need to
/// survive a restart.
///
/// # Thread Safety
///
/// Thread-safe; writes are serialized through an internal lock.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    namespaces: RwLock<HashMap<EntityKind, BTreeMap<String, RawRecord>>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records in a namespace.
    #[must_use]
    pub fn len(&self, kind: EntityKind) -> usize {
        self.namespaces
            .read()
            .get(&kind)
            .map_or(0, BTreeMap::len)
    }

    /// Returns true if the namespace holds no records.
    #[must_use]
    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.len(kind) == 0
    }
}

impl StoreBackend for MemoryBackend {
    fn put(&self, kind: EntityKind, record: RawRecord) -> StoreResult<()> {
        self.namespaces
            .write()
            .entry(kind)
            .or_default()
            .insert(record.id.clone(), record);
        Ok(())
    }

    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<RawRecord>> {
        Ok(self
            .namespaces
            .read()
            .get(&kind)
            .and_then(|ns| ns.get(id).cloned()))
    }

    fn get_all(&self, kind: EntityKind) -> StoreResult<Vec<RawRecord>> {
        Ok(self
            .namespaces
            .read()
            .get(&kind)
            .map(|ns| ns.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get_by_parent(&self, kind: EntityKind, parent_id: &str) -> StoreResult<Vec<RawRecord>> {
        Ok(self
            .namespaces
            .read()
            .get(&kind)
            .map(|ns| {
                ns.values()
                    .filter(|r| r.parent_id.as_deref() == Some(parent_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<bool> {
        Ok(self
            .namespaces
            .write()
            .get_mut(&kind)
            .is_some_and(|ns| ns.remove(id).is_some()))
    }

    fn flush(&self) -> StoreResult<()> {
        // All writes are committed synchronously
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, parent: Option<&str>) -> RawRecord {
        RawRecord {
            id: id.into(),
            parent_id: parent.map(String::from),
            payload: serde_json::json!({ "id": id }),
        }
    }

    #[test]
    fn put_then_get() {
        let backend = MemoryBackend::new();
        backend
            .put(EntityKind::Chapter, record("ch-1", Some("doc-1")))
            .unwrap();

        let found = backend.get(EntityKind::Chapter, "ch-1").unwrap().unwrap();
        assert_eq!(found.id, "ch-1");
        assert_eq!(found.parent_id.as_deref(), Some("doc-1"));
    }

    #[test]
    fn put_is_an_upsert() {
        let backend = MemoryBackend::new();
        backend
            .put(EntityKind::Chapter, record("ch-1", Some("doc-1")))
            .unwrap();

        let mut replacement = record("ch-1", Some("doc-1"));
        replacement.payload = serde_json::json!({ "id": "ch-1", "title": "v2" });
        backend.put(EntityKind::Chapter, replacement).unwrap();

        assert_eq!(backend.len(EntityKind::Chapter), 1);
        let found = backend.get(EntityKind::Chapter, "ch-1").unwrap().unwrap();
        assert_eq!(found.payload["title"], "v2");
    }

    #[test]
    fn parent_index_scan() {
        let backend = MemoryBackend::new();
        backend
            .put(EntityKind::Paragraph, record("p-1", Some("ch-1")))
            .unwrap();
        backend
            .put(EntityKind::Paragraph, record("p-2", Some("ch-1")))
            .unwrap();
        backend
            .put(EntityKind::Paragraph, record("p-3", Some("ch-2")))
            .unwrap();

        let hits = backend
            .get_by_parent(EntityKind::Paragraph, "ch-1")
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.parent_id.as_deref() == Some("ch-1")));
    }

    #[test]
    fn namespaces_are_isolated() {
        let backend = MemoryBackend::new();
        backend
            .put(EntityKind::Chapter, record("x", None))
            .unwrap();
        assert!(backend.get(EntityKind::Paragraph, "x").unwrap().is_none());
    }

    #[test]
    fn delete_reports_presence() {
        let backend = MemoryBackend::new();
        backend
            .put(EntityKind::Chapter, record("ch-1", None))
            .unwrap();
        assert!(backend.delete(EntityKind::Chapter, "ch-1").unwrap());
        assert!(!backend.delete(EntityKind::Chapter, "ch-1").unwrap());
        assert!(backend.get(EntityKind::Chapter, "ch-1").unwrap().is_none());
    }
}
