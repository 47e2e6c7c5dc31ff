//! # Poller Configuration

use std::time::Duration;

use shared_types::ModuleAddress;

use crate::schedule::PollSchedule;

/// Configuration for the polling loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// When ticks fire.
    pub schedule: PollSchedule,

    /// Modules reconciled on every tick, in order.
    pub modules: Vec<ModuleAddress>,

    /// Buffered updates per subscriber. A subscriber that falls further
    /// behind than this loses the oldest updates it never read.
    pub subscriber_capacity: usize,
}

impl PollerConfig {
    pub fn new(schedule: PollSchedule, modules: Vec<ModuleAddress>) -> Self {
        Self {
            schedule,
            modules,
            subscriber_capacity: 16,
        }
    }

    /// Create a config for testing (20ms ticks, small buffers).
    pub fn for_testing(modules: Vec<ModuleAddress>) -> Self {
        Self {
            schedule: PollSchedule::Every(Duration::from_millis(20)),
            modules,
            subscriber_capacity: 4,
        }
    }
}
