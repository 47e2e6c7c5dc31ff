//! # Outbound Ports (Driven Ports)
//!
//! The key-value backend the registry store is implemented against.
//!
//! Production: `RocksDbStore` (mirror-runtime/src/adapters/rocksdb_store.rs)
//! Testing: `InMemoryStore` (below)

use std::collections::BTreeMap;

use parking_lot::RwLock;
use thiserror::Error;

/// Errors from the key-value backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KvError {
    /// I/O or backend-internal failure.
    #[error("kv backend i/o error: {0}")]
    Io(String),

    /// The backend could not apply a write right now; retrying the whole
    /// batch is safe.
    #[error("kv backend busy: {0}")]
    Busy(String),
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Flow control for prefix scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    /// Keep visiting rows.
    Continue,
    /// Stop the scan early.
    Stop,
}

/// A consistent point-in-time view of the store.
///
/// All reads through one `ReadView` observe the same committed state, even
/// while a concurrent batch commits. The view holds backend resources (a
/// snapshot or a read lock) and must be dropped promptly.
pub trait ReadView {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError>;

    /// Visit rows with a prefix in lexicographic key order.
    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> ScanControl,
    ) -> Result<(), KvError>;
}

/// Abstract interface for the key-value backend.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Get a value by key (uncoordinated single read).
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch become visible, or NONE are
    /// applied. Readers never observe an intermediate state.
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KvError>;

    /// Collect all rows with a prefix, in lexicographic key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError>;

    /// Run `f` against one consistent read view.
    ///
    /// The adapter must serve every read inside `f` from a single snapshot;
    /// it must not open a second independent connection mid-view.
    fn with_read_view(&self, f: &mut dyn FnMut(&dyn ReadView)) -> Result<(), KvError>;
}

/// In-memory key-value store for unit tests.
///
/// A `BTreeMap` under one `RwLock`: batch writes take the write lock, so a
/// read view (read lock) observes either all of a batch or none of it.
#[derive(Default)]
pub struct InMemoryStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored (test helper).
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Overwrite a raw row in place (test helper for corruption scenarios).
    pub fn corrupt(&self, key: &[u8], value: Vec<u8>) {
        self.data.write().insert(key.to_vec(), value);
    }
}

struct MapView<'a> {
    data: &'a BTreeMap<Vec<u8>, Vec<u8>>,
}

impl ReadView for MapView<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.data.get(key).cloned())
    }

    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> ScanControl,
    ) -> Result<(), KvError> {
        for (key, value) in self.data.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) {
                break;
            }
            if visit(key, value) == ScanControl::Stop {
                break;
            }
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KvError> {
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvError> {
        let data = self.data.read();
        let results = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }

    fn with_read_view(&self, f: &mut dyn FnMut(&dyn ReadView)) -> Result<(), KvError> {
        let data = self.data.read();
        f(&MapView { data: &data });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_write_and_get() {
        let store = InMemoryStore::new();
        store
            .atomic_batch_write(vec![
                BatchOperation::put(b"a1".as_slice(), b"v1".as_slice()),
                BatchOperation::put(b"a2".as_slice(), b"v2".as_slice()),
            ])
            .unwrap();

        assert_eq!(store.get(b"a1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.len(), 2);

        store
            .atomic_batch_write(vec![BatchOperation::delete(b"a1".as_slice())])
            .unwrap();
        assert_eq!(store.get(b"a1").unwrap(), None);
    }

    #[test]
    fn test_prefix_scan_is_ordered() {
        let store = InMemoryStore::new();
        store
            .atomic_batch_write(vec![
                BatchOperation::put(b"k:b".as_slice(), b"2".as_slice()),
                BatchOperation::put(b"k:a".as_slice(), b"1".as_slice()),
                BatchOperation::put(b"x:z".as_slice(), b"9".as_slice()),
            ])
            .unwrap();

        let rows = store.prefix_scan(b"k:").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, b"k:a".to_vec());
        assert_eq!(rows[1].0, b"k:b".to_vec());
    }

    #[test]
    fn test_read_view_scan_stops_on_control() {
        let store = InMemoryStore::new();
        store
            .atomic_batch_write(vec![
                BatchOperation::put(b"k:a".as_slice(), b"1".as_slice()),
                BatchOperation::put(b"k:b".as_slice(), b"2".as_slice()),
                BatchOperation::put(b"k:c".as_slice(), b"3".as_slice()),
            ])
            .unwrap();

        let mut seen = 0;
        store
            .with_read_view(&mut |view| {
                view.scan_prefix(b"k:", &mut |_k, _v| {
                    seen += 1;
                    if seen == 2 {
                        ScanControl::Stop
                    } else {
                        ScanControl::Continue
                    }
                })
                .unwrap();
            })
            .unwrap();
        assert_eq!(seen, 2);
    }
}
