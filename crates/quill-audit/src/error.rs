//! Error types for the audit crate.

use thiserror::Error;

/// Errors that can occur during audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// An append referenced an entity with no entry in this unit of work.
    #[error("no audit entry for resource {id}")]
    EntryNotFound { id: u64 },

    /// An entry for the entity already exists in this unit of work.
    #[error("audit entry for resource {id} already exists")]
    DuplicateEntry { id: u64 },

    /// A record could not be mapped onto the storage schema.
    #[error("invalid audit record: {0}")]
    InvalidRecord(String),

    /// Storage error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuditError {
    /// Whether the error is a caller-side lifecycle violation rather than an
    /// I/O or storage problem.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::EntryNotFound { .. } | Self::DuplicateEntry { .. })
    }
}
