//! # Registry-Mirror Test Suite
//!
//! Unified test crate for scenarios that span more than one crate:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── reconciliation.rs  # Full passes against a mock chain
//!     ├── read_api.rs        # Mirror queries and streaming export
//!     └── persistence.rs     # RocksDB end-to-end, identity guard
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mirror-tests
//! cargo test -p mirror-tests integration::reconciliation::
//! ```

pub mod integration;
