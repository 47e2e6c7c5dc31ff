//! # Registry Poller
//!
//! Drives the reconciler on a schedule. Each tick resolves the current
//! chain head through the [`BlockSource`](ports::BlockSource) port and runs
//! one reconciliation pass per configured module.
//!
//! ## Guarantees
//!
//! | Guarantee | Meaning |
//! |-----------|---------|
//! | Single flight | A tick that fires while the previous pass for a module is still running skips that module instead of queueing |
//! | Fail open | A failed pass is reported and logged; the loop keeps ticking |
//! | Clean stop | [`PollerHandle::stop`](service::PollerHandle::stop) finishes the in-flight tick before exiting |

pub mod config;
pub mod ports;
pub mod schedule;
pub mod service;

pub use config::PollerConfig;
pub use ports::{BlockSource, BlockSourceError, MockBlockSource};
pub use schedule::{PollSchedule, ScheduleError};
pub use service::{PollOutcome, PollerHandle, RegistryPoller, Subscription};
