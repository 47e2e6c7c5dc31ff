//! # Mirror Runtime
//!
//! Production wiring for the registry mirror: the RocksDB key-value
//! backend, environment configuration, the database identity guard, and
//! the constructor that assembles store, reconciler and poller into one
//! running unit.
//!
//! The crate is a library on purpose. The chain-facing transport (a
//! [`ContractGateway`](rm_03_reconciler::ports::outbound::ContractGateway)
//! and a [`BlockSource`](rm_04_poller::BlockSource)) is injected by the
//! binary that embeds the mirror.

pub mod adapters;
pub mod config;
pub mod identity;
pub mod wiring;

pub use adapters::rocksdb_store::{RocksDbConfig, RocksDbStore};
pub use config::{ConfigError, RuntimeConfig};
pub use identity::{enforce_identity, IdentityGuardError};
pub use wiring::{MirrorRuntime, RuntimeError};
