//! # Storage Errors

use thiserror::Error;

use crate::ports::outbound::KvError;

/// Errors that can occur in the Registry Storage subsystem.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Row failed to serialize or deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Row checksum mismatch detected during read.
    #[error("data corruption: checksum mismatch for row {key_hex}")]
    DataCorruption {
        /// Hex rendering of the offending storage key.
        key_hex: String,
    },

    /// The backing store rejected a commit; the whole update may be retried.
    #[error("storage conflict: {0}")]
    Conflict(String),

    /// A streaming export stalled past its inactivity window.
    #[error("stream timed out after {idle_ms}ms without consumer progress")]
    StreamTimeout {
        /// Milliseconds the consumer was stalled.
        idle_ms: u64,
    },

    /// Underlying key-value backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<KvError> for StorageError {
    fn from(err: KvError) -> Self {
        match err {
            KvError::Busy(msg) => StorageError::Conflict(msg),
            KvError::Io(msg) => StorageError::Backend(msg),
        }
    }
}
