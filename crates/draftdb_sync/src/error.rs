//! Error types for the sync layer.

use draftdb_model::EntityId;
use draftdb_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during reconciliation and sync.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A local store write failed. Surfaced to the caller; the local
    /// mutation is abandoned, not retried automatically.
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    /// The remote store rejected a request or was unreachable. The
    /// entity stays unsynced and is retried on the next pass trigger.
    #[error("remote error: {message}")]
    Remote {
        /// Error message.
        message: String,
        /// Whether the request can be retried.
        retryable: bool,
    },

    /// A remote request exceeded the configured timeout.
    #[error("remote request timed out")]
    Timeout,

    /// A dependent still names a temporary parent id at dispatch time.
    /// Must not occur under correct pass ordering; the entity is
    /// deferred to the next pass rather than dispatched.
    #[error("entity {entity} still references temporary parent {parent}")]
    ReferentialInconsistency {
        /// The dependent that was about to be dispatched.
        entity: EntityId,
        /// The stale temporary parent id it references.
        parent: EntityId,
    },
}

impl SyncError {
    /// Creates a retryable remote error.
    pub fn remote_retryable(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable remote error.
    pub fn remote_fatal(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if retrying the operation can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Remote { retryable, .. } => *retryable,
            SyncError::Timeout => true,
            SyncError::ReferentialInconsistency { .. } => true,
            SyncError::Store(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::remote_retryable("connection reset").is_retryable());
        assert!(!SyncError::remote_fatal("unknown entity kind").is_retryable());
        assert!(SyncError::Timeout.is_retryable());
        assert!(SyncError::ReferentialInconsistency {
            entity: EntityId::new("p-1"),
            parent: EntityId::temp(),
        }
        .is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::remote_retryable("503");
        assert_eq!(err.to_string(), "remote error: 503");

        let err = SyncError::ReferentialInconsistency {
            entity: EntityId::new("p-1"),
            parent: EntityId::new("temp-x"),
        };
        assert!(err.to_string().contains("p-1"));
        assert!(err.to_string().contains("temp-x"));
    }
}
