//! File-based store backend for persistent storage.

use crate::backend::{RawRecord, StoreBackend};
use crate::error::{StoreError, StoreResult};
use draftdb_model::EntityKind;
use fs2::FileExt;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";

const ALL_KINDS: [EntityKind; 3] = [
    EntityKind::Document,
    EntityKind::Chapter,
    EntityKind::Paragraph,
];

/// A file-based store backend.
///
/// Each namespace is persisted as one JSON snapshot file
/// (`documents.json`, `chapters.json`, `paragraphs.json`) under a data
/// directory. Every write rewrites the affected namespace through a
/// temp-file-and-rename, so a crash mid-write leaves the previous
/// snapshot intact. Data survives process restart.
///
/// The data directory is guarded by an advisory lock so two processes
/// cannot write the same document store concurrently.
///
/// # Thread Safety
///
/// Thread-safe; all writes are serialized through an internal lock.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    namespaces: RwLock<HashMap<EntityKind, BTreeMap<String, RawRecord>>>,
    // Held for the lifetime of the backend; unlocked on drop.
    _lock: File,
}

impl FileBackend {
    /// Opens a store at the given directory, creating it if needed and
    /// loading any existing namespace snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if another process holds the
    /// directory lock, or an I/O / corruption error if a snapshot
    /// cannot be read.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;

        let lock = File::create(dir.join(LOCK_FILE))?;
        lock.try_lock_exclusive()
            .map_err(|_| StoreError::Locked(dir.display().to_string()))?;

        let mut namespaces = HashMap::new();
        for kind in ALL_KINDS {
            namespaces.insert(kind, Self::load_namespace(dir, kind)?);
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            namespaces: RwLock::new(namespaces),
            _lock: lock,
        })
    }

    /// Returns the data directory path.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn namespace_path(dir: &Path, kind: EntityKind) -> PathBuf {
        dir.join(format!("{}.json", kind.namespace()))
    }

    fn load_namespace(dir: &Path, kind: EntityKind) -> StoreResult<BTreeMap<String, RawRecord>> {
        let path = Self::namespace_path(dir, kind);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupted(format!("{}: {e}", path.display())))
    }

    /// Writes a namespace snapshot atomically: serialize to a sibling
    /// temp file, then rename over the snapshot.
    fn persist_namespace(
        &self,
        kind: EntityKind,
        records: &BTreeMap<String, RawRecord>,
    ) -> StoreResult<()> {
        let path = Self::namespace_path(&self.dir, kind);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(records)?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl StoreBackend for FileBackend {
    fn put(&self, kind: EntityKind, record: RawRecord) -> StoreResult<()> {
        let mut namespaces = self.namespaces.write();
        let ns = namespaces.entry(kind).or_default();
        ns.insert(record.id.clone(), record);
        self.persist_namespace(kind, ns)
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
        let mut namespaces = self.namespaces.write();
        let ns = namespaces.entry(kind).or_default();
        if ns.remove(id).is_none() {
            return Ok(false);
        }
        self.persist_namespace(kind, ns)?;
        Ok(true)
    }

    fn flush(&self) -> StoreResult<()> {
        // Every put/delete persists its namespace before returning
        Ok(())
    }
}
