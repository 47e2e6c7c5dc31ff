//! # Reconciler Domain
//!
//! Pure logic: the boundary calculator and the error taxonomy.

pub mod boundary;
pub mod errors;

pub use boundary::{compute_range, safe_boundary, KeyRange, ReconcileMode};
pub use errors::ReconcileError;
