//! # Storage Ports
//!
//! - `inbound` - the read API the presentation layer consumes
//! - `outbound` - the key-value backend the store is implemented against

pub mod inbound;
pub mod outbound;

pub use inbound::{KeyFilter, RegistryReadApi};
pub use outbound::{BatchOperation, InMemoryStore, KeyValueStore, KvError, ReadView, ScanControl};
