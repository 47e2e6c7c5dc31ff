//! # Storage Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the registry store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Buffered rows between the streaming producer and its consumer.
    pub stream_channel_capacity: usize,

    /// How long a streaming consumer may stall before the cursor is
    /// forcibly terminated and its read view released.
    pub stream_inactivity_window: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            stream_channel_capacity: 256,
            stream_inactivity_window: Duration::from_secs(30),
        }
    }
}

impl StorageConfig {
    /// Create a config for testing (tiny buffer, short stall window).
    pub fn for_testing() -> Self {
        Self {
            stream_channel_capacity: 2,
            stream_inactivity_window: Duration::from_millis(100),
        }
    }
}
