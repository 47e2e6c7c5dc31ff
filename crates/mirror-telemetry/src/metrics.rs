//! # Reconciliation Metrics
//!
//! Prometheus metrics for monitoring the reconciliation engine.
//!
//! ## Metrics Exported
//!
//! - `registry_updates_total` - Counter of completed reconciliation passes
//! - `registry_update_failures_total` - Counter of failed passes (by reason)
//! - `registry_keys_upserted_total` - Counter of key rows written
//! - `registry_keys_deleted_total` - Counter of key rows deleted
//! - `registry_stream_timeouts_total` - Counter of terminated export cursors
//! - `registry_poll_ticks_total` - Counter of poller ticks (by outcome)
//! - `registry_update_duration_seconds` - Histogram of pass durations

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

lazy_static! {
    /// Total completed reconciliation passes.
    pub static ref UPDATES_TOTAL: IntCounter = register_int_counter!(
        "registry_updates_total",
        "Total number of completed reconciliation passes"
    )
    .expect("Failed to create UPDATES_TOTAL metric");

    /// Total failed reconciliation passes, labeled by reason.
    pub static ref UPDATE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "registry_update_failures_total",
        "Total number of failed reconciliation passes",
        &["reason"]
    )
    .expect("Failed to create UPDATE_FAILURES metric");

    /// Total key rows written by committed passes.
    pub static ref KEYS_UPSERTED: IntCounter = register_int_counter!(
        "registry_keys_upserted_total",
        "Total number of key rows written"
    )
    .expect("Failed to create KEYS_UPSERTED metric");

    /// Total key rows deleted by committed passes.
    pub static ref KEYS_DELETED: IntCounter = register_int_counter!(
        "registry_keys_deleted_total",
        "Total number of key rows deleted"
    )
    .expect("Failed to create KEYS_DELETED metric");

    /// Total streaming exports terminated for consumer inactivity.
    pub static ref STREAM_TIMEOUTS: IntCounter = register_int_counter!(
        "registry_stream_timeouts_total",
        "Total number of export cursors terminated for inactivity"
    )
    .expect("Failed to create STREAM_TIMEOUTS metric");

    /// Total poller ticks fired, labeled by outcome.
    pub static ref POLL_TICKS: IntCounterVec = register_int_counter_vec!(
        "registry_poll_ticks_total",
        "Total number of poller ticks fired",
        &["outcome"]
    )
    .expect("Failed to create POLL_TICKS metric");

    /// Wall-clock duration of reconciliation passes.
    pub static ref UPDATE_DURATION: Histogram = register_histogram!(
        "registry_update_duration_seconds",
        "Duration of reconciliation passes in seconds"
    )
    .expect("Failed to create UPDATE_DURATION metric");
}
