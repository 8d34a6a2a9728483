//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during local store operations.
///
/// A failed write means the specific local mutation is abandoned and
/// surfaced to the caller; the store does not retry on its own.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred while persisting or loading a namespace.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data directory is locked by another process.
    #[error("data directory is locked: {0}")]
    Locked(String),

    /// A namespace snapshot on disk is not readable as a record map.
    #[error("store corrupted: {0}")]
    Corrupted(String),
}
