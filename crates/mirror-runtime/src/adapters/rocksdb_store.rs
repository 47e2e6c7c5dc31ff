//! # RocksDB Storage Adapter
//!
//! Production implementation of the storage layer's `KeyValueStore` port.
//!
//! - Atomic batch writes (`WriteBatch`)
//! - Consistent read views backed by RocksDB snapshots
//! - Snappy compression, bloom filters, optional fsync per write
//!
//! The registry keyspace prefixes (`o:`, `k:`, `m:`, `p:`, `a:`) namespace
//! the rows, so a single default column family is enough.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use rm_02_registry_storage::{BatchOperation, KeyValueStore, KvError, ReadView, ScanControl};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use tracing::info;

/// RocksDB tuning knobs.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: String,
    /// Block cache size in bytes.
    pub block_cache_size: usize,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Maximum number of write buffers.
    pub max_write_buffer_number: i32,
    /// fsync after each committed batch.
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/registry-mirror".to_string(),
            block_cache_size: 128 * 1024 * 1024,
            write_buffer_size: 32 * 1024 * 1024,
            max_write_buffer_number: 3,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create a config for testing (small buffers, no fsync).
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 4 * 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            max_write_buffer_number: 2,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed key-value store.
pub struct RocksDbStore {
    db: Arc<RwLock<DB>>,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, KvError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| KvError::Io(format!("failed to open RocksDB: {e}")))?;
        info!(path = %config.path, "opened registry database");

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config,
        })
    }

    /// Open at a path with default tuning.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, KvError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        })
    }
}

struct SnapshotView<'a> {
    snapshot: &'a rocksdb::Snapshot<'a>,
}

impl ReadView for SnapshotView<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        self.snapshot
            .get(key)
            .map_err(|e| KvError::Io(format!("RocksDB snapshot get failed: {e}")))
    }

    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> ScanControl,
    ) -> Result<(), KvError> {
        let iter = self
            .snapshot
            .iterator(IteratorMode::From(prefix, Direction::Forward));
        for item in iter {
            let (key, value) =
                item.map_err(|e| KvError::Io(format!("RocksDB snapshot scan failed: {e}")))?;
            if !key.starts_with(prefix) {
                break;
            }
            if visit(&key, &value) == ScanControl::Stop {
                break;
            }
        }
        Ok(())
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        let db = self.db.read();
        db.get(key)
            .map_err(|e| KvError::Io(format!("RocksDB get failed: {e}")))
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KvError> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }

        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        db.write_opt(batch, &write_opts)
            .map_err(|e| KvError::Io(format!("RocksDB batch write failed: {e}")))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError> {
        let db = self.db.read();
        let mut results = Vec::new();
        let iter = db.iterator(IteratorMode::From(prefix, Direction::Forward));
        for item in iter {
            let (key, value) =
                item.map_err(|e| KvError::Io(format!("RocksDB scan failed: {e}")))?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }

    fn with_read_view(&self, f: &mut dyn FnMut(&dyn ReadView)) -> Result<(), KvError> {
        let db = self.db.read();
        let snapshot = db.snapshot();
        f(&SnapshotView {
            snapshot: &snapshot,
        });
        Ok(())
    }
}
