//! Cross-crate integration scenarios.

pub mod fixtures;
pub mod packed_flow;
pub mod persistence;
pub mod polling;
pub mod read_api;
pub mod reconciliation;
