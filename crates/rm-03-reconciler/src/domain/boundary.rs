//! # Boundary Calculator
//!
//! Pure computation of the half-open key-index range `[from, to)` that must
//! be re-read from the chain for one operator.
//!
//! Two operating modes exist because the two kinds of mirrors carry
//! different reorg risk. A full-registry mirror includes vetted-but-unused
//! keys, which can still change if the vetting transaction is reorged out,
//! so it only trusts data up to the last *finalized* used-key count. A
//! used-only mirror stores nothing but keys consumed by an irrevocable
//! deposit, so it trusts everything up to the last observed used-key count
//! even before finalization.

use serde::{Deserialize, Serialize};
use shared_types::RegistryOperator;

/// Which kind of mirror is being maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileMode {
    /// Mirror the whole key array, including vetted-but-unused keys.
    FullRegistry,
    /// Mirror only keys already consumed by a deposit.
    UsedOnly,
}

/// A half-open key-index range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange {
    /// Inclusive start.
    pub from: u64,
    /// Exclusive end.
    pub to: u64,
}

impl KeyRange {
    /// Whether no fetch is needed for this range.
    ///
    /// An empty range still drives the truncation step: stored keys at or
    /// past `to` are deleted regardless.
    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }

    /// Number of records the range covers.
    pub fn len(&self) -> u64 {
        self.to.saturating_sub(self.from)
    }
}

/// The highest key index (exclusive) whose stored value is immutable
/// ground truth for this operator.
pub fn safe_boundary(previous: &RegistryOperator, mode: ReconcileMode) -> u64 {
    match mode {
        ReconcileMode::FullRegistry => previous.finalized_used_signing_keys,
        ReconcileMode::UsedOnly => previous.used_signing_keys,
    }
}

/// Compute the range that must be re-read for one operator.
///
/// `previous` is the stored operator snapshot, or `None` on first sight.
pub fn compute_range(
    previous: Option<&RegistryOperator>,
    fetched: &RegistryOperator,
    mode: ReconcileMode,
) -> KeyRange {
    let from = previous.map(|p| safe_boundary(p, mode)).unwrap_or(0);
    let to = match mode {
        ReconcileMode::FullRegistry => fetched.total_signing_keys,
        ReconcileMode::UsedOnly => fetched.used_signing_keys,
    };
    KeyRange { from, to }
}
