//! # Storage Domain
//!
//! Keyspace layout, checksummed row codec and error types.

pub mod errors;
pub mod keyspace;
pub mod rows;

pub use errors::StorageError;
