//! # Mirror Telemetry
//!
//! Observability for Registry-Mirror: structured logging via `tracing` and
//! Prometheus metrics for the reconciliation engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mirror_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("failed to init logging");
//!
//!     // Reconciler and poller logs/metrics are now being collected.
//! }
//! ```
//!
//! Exposing the gathered metrics (HTTP scrape endpoint, push gateway, ...)
//! belongs to outer bootstrap code, not to this crate.

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The tracing subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The log filter expression was invalid.
    #[error("invalid log filter: {0}")]
    Filter(String),
}
