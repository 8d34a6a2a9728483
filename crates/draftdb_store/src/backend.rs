//! Store backend trait definition.

use crate::error::StoreResult;
use draftdb_model::EntityKind;
use serde::{Deserialize, Serialize};

/// A raw record as the backend stores it.
///
/// Backends are opaque to entity semantics: they see an id, an optional
/// parent id that feeds the secondary index, and a JSON payload. The
/// typed [`crate::EditorStore`] layer owns all interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Primary key within the namespace.
    pub id: String,
    /// Secondary index key: the parent scope, if the kind has one.
    pub parent_id: Option<String>,
    /// JSON-encoded entity.
    pub payload: serde_json::Value,
}

/// The local store contract.
///
/// One namespace per entity kind; primary lookup by id; secondary
/// lookup by parent id; no query language beyond exact-match index
/// scan.
///
/// # Invariants
///
/// - `put` upserts: a record with an existing id replaces the previous
///   record entirely (last submitted write wins)
/// - Writes to a given id are serialized; reads observe the latest
///   committed write
/// - `get_by_parent` returns exactly the records whose `parent_id`
///   equals the queried id, in unspecified order
///
/// # Implementors
///
/// - [`crate::MemoryBackend`] - for testing
/// - [`crate::FileBackend`] - for persistent storage
pub trait StoreBackend: Send + Sync {
    /// Upserts a record by id.
    fn put(&self, kind: EntityKind, record: RawRecord) -> StoreResult<()>;

    /// Gets a record by id.
    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<RawRecord>>;

    /// Returns all records in a namespace.
    fn get_all(&self, kind: EntityKind) -> StoreResult<Vec<RawRecord>>;

    /// Returns all records whose parent id matches.
    fn get_by_parent(&self, kind: EntityKind, parent_id: &str) -> StoreResult<Vec<RawRecord>>;

    /// Deletes a record by id. Returns true if a record was removed.
    fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<bool>;

    /// Settles any pending writes.
    ///
    /// After this returns, every previously submitted write is
    /// observable by subsequent reads and, for persistent backends,
    /// durable.
    fn flush(&self) -> StoreResult<()>;
}
