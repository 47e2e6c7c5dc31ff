//! # Shared Error Types
//!
//! Errors that cross subsystem boundaries. Subsystem-specific errors live in
//! their own crates and wrap these where needed.

use thiserror::Error;

use crate::entities::AppIdentity;

/// Errors raised while validating operator snapshots fetched from a reader.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// Fetched operator counters violate `finalized <= used <= total`.
    #[error(
        "inconsistent operator counters for operator {operator_index}: \
         finalized={finalized} used={used} total={total}"
    )]
    InconsistentCounters {
        /// Index of the offending operator.
        operator_index: u64,
        /// Finalized used-key count as fetched.
        finalized: u64,
        /// Used-key count as fetched.
        used: u64,
        /// Total key count as fetched.
        total: u64,
    },
}

/// Errors raised by the application-identity guard.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The database already belongs to a different chain deployment.
    #[error("database identity mismatch: stored {stored:?}, configured {configured:?}")]
    Mismatch {
        /// Identity recorded in the database.
        stored: AppIdentity,
        /// Identity the running process was configured with.
        configured: AppIdentity,
    },
}
