//! # Reconciler Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::boundary::ReconcileMode;

/// Configuration for the reconciliation service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Which kind of mirror this deployment maintains.
    pub mode: ReconcileMode,

    /// How many operators' key ranges are fetched concurrently within one
    /// pass. The RPC transport applies its own batching below this.
    pub fetch_concurrency: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            mode: ReconcileMode::FullRegistry,
            fetch_concurrency: 4,
        }
    }
}

impl ReconcilerConfig {
    /// Create a config for testing (serial fetches).
    pub fn for_testing(mode: ReconcileMode) -> Self {
        Self {
            mode,
            fetch_concurrency: 1,
        }
    }
}

/// Knobs forwarded to the RPC transport below the contract gateway.
///
/// All values must be positive; `new` rejects zeroes so a misconfigured
/// deployment fails at wiring time instead of stalling at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Maximum key records requested in one batched contract call.
    pub max_batch_size: usize,

    /// Maximum concurrent outbound requests.
    pub max_concurrent_requests: usize,

    /// How long the transport aggregates calls into one batch.
    pub batch_aggregation_wait: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1100,
            max_concurrent_requests: 5,
            batch_aggregation_wait: Duration::from_millis(10),
        }
    }
}

/// Rejected transport configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportConfigError {
    /// A knob that must be positive was zero.
    #[error("{name} must be positive")]
    Zero {
        /// The offending field.
        name: &'static str,
    },
}

impl TransportConfig {
    /// Validated constructor.
    pub fn new(
        max_batch_size: usize,
        max_concurrent_requests: usize,
        batch_aggregation_wait: Duration,
    ) -> Result<Self, TransportConfigError> {
        if max_batch_size == 0 {
            return Err(TransportConfigError::Zero {
                name: "max_batch_size",
            });
        }
        if max_concurrent_requests == 0 {
            return Err(TransportConfigError::Zero {
                name: "max_concurrent_requests",
            });
        }
        if batch_aggregation_wait.is_zero() {
            return Err(TransportConfigError::Zero {
                name: "batch_aggregation_wait",
            });
        }
        Ok(Self {
            max_batch_size,
            max_concurrent_requests,
            batch_aggregation_wait,
        })
    }
}
