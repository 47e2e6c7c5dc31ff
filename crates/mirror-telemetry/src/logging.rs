//! Structured logging setup.
//!
//! Plain fmt output for development, JSON output for deployments where a
//! log shipper parses the stream. The filter honors `RUST_LOG`-style
//! directives from the config's `log_level`.

use tracing_subscriber::EnvFilter;

use crate::{TelemetryConfig, TelemetryError};

/// Install the global tracing subscriber.
///
/// Returns an error if a subscriber is already installed or the filter
/// expression does not parse.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Filter(e.to_string()))?;

    if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "logging initialized"
    );
    Ok(())
}
