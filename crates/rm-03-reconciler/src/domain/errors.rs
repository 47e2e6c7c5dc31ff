//! # Reconciler Errors

use rm_02_registry_storage::StorageError;
use shared_types::{ModuleAddress, SnapshotError};
use thiserror::Error;

use crate::ports::outbound::ReaderError;

/// Errors surfaced by a reconciliation pass.
///
/// None of these leave partial writes behind: the staged batch is discarded
/// on every pre-commit failure, and the commit itself is atomic.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The remote reader failed (network, timeout, malformed response).
    /// Safe to retry on the next poll tick.
    #[error("remote read failed: {0}")]
    Remote(ReaderError),

    /// An inverted key range was produced or requested. This is a
    /// programming or contract-state inconsistency; do not retry blindly.
    #[error("invalid key range requested: [{from}, {to})")]
    Range {
        /// Inclusive start of the offending range.
        from: u64,
        /// Exclusive end of the offending range.
        to: u64,
    },

    /// A fetched operator snapshot was internally inconsistent.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Storage rejected the pass; retrying the whole update is safe.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Another update for the same module is already in flight.
    #[error("update already in flight for module {module}")]
    InFlight {
        /// The module whose lock was held.
        module: ModuleAddress,
    },
}

impl From<ReaderError> for ReconcileError {
    fn from(err: ReaderError) -> Self {
        // An inverted range reported by the reader or codec is a logic
        // error, not a transient remote failure.
        if let ReaderError::Decode(rm_01_record_codec::CodecError::InvalidRange { from, to }) = err
        {
            return ReconcileError::Range { from, to };
        }
        ReconcileError::Remote(err)
    }
}

impl ReconcileError {
    /// Whether this failure signals broken contract state or a logic error
    /// rather than a transient fault. These abort the pass and are logged
    /// at error level; retrying without investigation is pointless.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ReconcileError::Range { .. })
    }

    /// Short label for failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ReconcileError::Remote(_) => "remote",
            ReconcileError::Range { .. } => "range",
            ReconcileError::Snapshot(_) => "snapshot",
            ReconcileError::Storage(StorageError::Conflict(_)) => "conflict",
            ReconcileError::Storage(_) => "storage",
            ReconcileError::InFlight { .. } => "in_flight",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_range_errors_are_invariant_violations() {
        let range = ReconcileError::Range { from: 5, to: 2 };
        assert!(range.is_invariant_violation());

        let remote = ReconcileError::Remote(ReaderError::Network("timeout".into()));
        assert!(!remote.is_invariant_violation());

        let busy = ReconcileError::InFlight {
            module: ModuleAddress::repeat_byte(1),
        };
        assert!(!busy.is_invariant_violation());
    }
}
