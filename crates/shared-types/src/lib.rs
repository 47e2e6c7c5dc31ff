//! # Shared Types Crate
//!
//! This crate contains all domain entities shared across the Registry-Mirror
//! subsystems: operators, keys, module metadata and the application identity
//! record.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Plain Data**: Entities are serde-derived structs with no persistence
//!   or networking behavior attached; repositories and readers live in the
//!   subsystem crates.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
