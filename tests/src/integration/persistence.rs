//! # Persistence Scenarios
//!
//! The same reconciliation flows over the production RocksDB backend,
//! including process-restart survival and the deployment identity guard.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mirror_runtime::{enforce_identity, IdentityGuardError, RocksDbConfig, RocksDbStore};
    use rm_02_registry_storage::{RegistryReadApi, RegistryStore, StorageConfig};
    use rm_03_reconciler::{MockRegistryReader, ReconcileMode, Reconciler, ReconcilerConfig};
    use shared_types::{AppIdentity, H160};
    use tempfile::TempDir;
    use tokio_stream::StreamExt;

    use crate::integration::fixtures::{block, key, module, operator};

    fn open_store(path: &str) -> RegistryStore<RocksDbStore> {
        let kv = Arc::new(RocksDbStore::open(RocksDbConfig::for_testing(path)).unwrap());
        RegistryStore::new(kv, StorageConfig::for_testing())
    }

    fn seeded_reader() -> MockRegistryReader {
        let reader = MockRegistryReader::new();
        reader.set_operators(vec![operator(0, 1, 2, 3)]);
        reader.set_keys(
            0,
            vec![key(0, 0, 10, true), key(0, 1, 11, true), key(0, 2, 12, false)],
        );
        reader.set_nonce(4);
        reader
    }

    #[tokio::test]
    async fn test_mirror_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap().to_string();

        {
            let store = open_store(&path);
            let engine = Reconciler::new(
                store,
                Arc::new(seeded_reader()),
                ReconcilerConfig::for_testing(ReconcileMode::FullRegistry),
            );
            engine.update(module(), block(7)).await.unwrap();
        }

        let reopened = open_store(&path);
        let meta = reopened.get_meta(module()).unwrap().unwrap();
        assert_eq!(meta.block_number, 7);
        assert_eq!(meta.nonce, 4);

        let keys = reopened.operator_keys(module(), 0).unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].key, [10u8; 48]);
    }

    #[tokio::test]
    async fn test_second_pass_on_reopened_database_trusts_boundary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap().to_string();
        let reader = seeded_reader();

        {
            let engine = Reconciler::new(
                open_store(&path),
                Arc::new(reader.clone()),
                ReconcilerConfig::for_testing(ReconcileMode::FullRegistry),
            );
            engine.update(module(), block(7)).await.unwrap();
        }
        reader.clear_requested_ranges();

        // A new process picks up the same database and keeps going.
        let engine = Reconciler::new(
            open_store(&path),
            Arc::new(reader.clone()),
            ReconcilerConfig::for_testing(ReconcileMode::FullRegistry),
        );
        engine.update(module(), block(8)).await.unwrap();
        assert_eq!(reader.requested_ranges(), vec![(0, 1, 3)]);
    }

    #[tokio::test]
    async fn test_streaming_from_rocksdb_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = open_store(dir.path().to_str().unwrap());
        let engine = Reconciler::new(
            store.clone(),
            Arc::new(seeded_reader()),
            ReconcilerConfig::for_testing(ReconcileMode::FullRegistry),
        );
        engine.update(module(), block(1)).await.unwrap();

        let mut stream = store.stream_all_keys(module());
        let mut count = 0;
        while let Some(item) = stream.next().await {
            item.unwrap();
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_identity_guard_over_rocksdb() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap().to_string();
        let mainnet = AppIdentity {
            chain_id: 1,
            locator_address: H160::repeat_byte(0xAA),
        };

        {
            let store = open_store(&path);
            enforce_identity(&store, &mainnet).unwrap();
        }

        let store = open_store(&path);
        enforce_identity(&store, &mainnet).unwrap();

        let testnet = AppIdentity {
            chain_id: 17000,
            locator_address: H160::repeat_byte(0xBB),
        };
        let err = enforce_identity(&store, &testnet).unwrap_err();
        assert!(matches!(err, IdentityGuardError::Mismatch(_)));
    }
}
