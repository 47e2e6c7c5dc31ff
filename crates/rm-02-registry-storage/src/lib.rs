//! # Registry Storage (rm-02)
//!
//! The Storage subsystem is the authoritative persistence layer for mirrored
//! registry data: operators, signing keys and per-module snapshot metadata.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Atomic Commits | A reconciliation pass lands as one batch - all or nothing |
//! | 2 | Snapshot Coherence | Meta is written in the same batch as the rows it describes |
//! | 3 | Data Integrity | Row checksum verified on every read |
//! | 4 | Deterministic Order | Scans and streams order by operator index, then key index |
//! | 5 | Bounded Cursors | A stalled streaming consumer is cut off, releasing the read view |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Keyspace layout, row codec, error types
//! - `ports/` - Outbound `KeyValueStore`/`ReadView` ports, inbound read API
//! - `service/` - `RegistryStore` (staged updates, read API, streaming export)
//!
//! ## Usage
//!
//! ```ignore
//! use rm_02_registry_storage::{InMemoryStore, RegistryReadApi, RegistryStore, StorageConfig};
//!
//! let store = RegistryStore::new(Arc::new(InMemoryStore::new()), StorageConfig::default());
//!
//! let mut batch = store.begin_update(module);
//! batch.upsert_operator(&operator)?;
//! batch.upsert_key(&key, None)?;
//! batch.set_meta(&meta)?;
//! store.commit(batch)?;
//!
//! let (keys, meta) = store.get_keys(module, KeyFilter::default())?;
//! ```

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::StorageConfig;
pub use domain::errors::StorageError;
pub use domain::keyspace;
pub use ports::inbound::{KeyFilter, RegistryReadApi};
pub use ports::outbound::{
    BatchOperation, InMemoryStore, KeyValueStore, KvError, ReadView, ScanControl,
};
pub use service::stream::KeyStream;
pub use service::{RegistryStore, UpdateBatch};
