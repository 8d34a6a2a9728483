//! # DraftDB Store
//!
//! Local persistent store for DraftDB entities.
//!
//! This crate provides:
//! - [`StoreBackend`] - the raw key-value contract: upsert by id, lookup
//!   by id, namespace scan, and a secondary index by parent id
//! - [`MemoryBackend`] - for tests and ephemeral use
//! - [`FileBackend`] - persistent storage surviving process restart
//! - [`EditorStore`] - the typed layer the editor and the sync engine
//!   share; all serialization happens here
//!
//! ## Contract
//!
//! Writes to a given id are serialized: the last submitted write wins
//! and reads observe the latest committed write. A failed write
//! surfaces as a [`StoreError`] to the caller and is never retried by
//! the store itself.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod editor;
mod error;
mod file;
mod memory;

pub use backend::{RawRecord, StoreBackend};
pub use editor::{EditorStore, UnsyncedSet};
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
