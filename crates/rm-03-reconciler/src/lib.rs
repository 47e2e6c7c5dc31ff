//! # Registry Reconciler (rm-03)
//!
//! The reconciliation engine: given a target block, compute exactly which
//! operator and key records must be re-read from the chain, and apply the
//! diff to storage as one atomic update.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Safe Boundary | Key indices below the stored safe boundary are never re-read or overwritten |
//! | 2 | Atomic Update | A pass commits everything or nothing; failures leave prior state visible |
//! | 3 | Truncation | Stored keys at or past the fetched total are deleted |
//! | 4 | Single Flight | At most one update per module commits at a time |
//! | 5 | No Nonce Gate | The on-chain nonce is recorded, never used to skip work |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure boundary calculator and error types
//! - `ports/` - `RegistryReader` outbound port (+ mock)
//! - `adapters/` - `PackedRegistryReader` over a raw contract gateway
//! - `service.rs` - The `Reconciler` orchestrating reader + storage

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::{ReconcilerConfig, TransportConfig, TransportConfigError};
pub use domain::boundary::{compute_range, safe_boundary, KeyRange, ReconcileMode};
pub use domain::errors::ReconcileError;
pub use ports::outbound::{MockRegistryReader, ReaderError, RegistryReader};
pub use service::Reconciler;
