//! # Packed Transport Scenarios
//!
//! The full chain-to-store path: a gateway serving packed blobs, the
//! packed reader decoding them, and the reconciler committing the result.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use rm_01_record_codec::{encode_packed, KeyRecord};
    use rm_02_registry_storage::{InMemoryStore, RegistryStore, StorageConfig};
    use rm_03_reconciler::adapters::PackedRegistryReader;
    use rm_03_reconciler::ports::outbound::{ContractGateway, GatewayError};
    use rm_03_reconciler::{ReconcileMode, Reconciler, ReconcilerConfig, TransportConfig};
    use shared_types::{BlockRef, ModuleAddress, RegistryOperator};

    use crate::integration::fixtures::{block, module, operator};

    /// Gateway over one operator whose key array lives in memory as
    /// [`KeyRecord`]s, served back as packed blobs.
    struct PackedFixtureGateway {
        operator: RegistryOperator,
        records: Vec<KeyRecord>,
    }

    #[async_trait]
    impl ContractGateway for PackedFixtureGateway {
        async fn operator_count(
            &self,
            _module: ModuleAddress,
            _block: BlockRef,
        ) -> Result<u64, GatewayError> {
            Ok(1)
        }

        async fn operator_at(
            &self,
            _module: ModuleAddress,
            _index: u64,
            _block: BlockRef,
        ) -> Result<RegistryOperator, GatewayError> {
            Ok(self.operator.clone())
        }

        async fn signing_keys_batch(
            &self,
            _module: ModuleAddress,
            _operator_index: u64,
            from: u64,
            count: usize,
            _block: BlockRef,
        ) -> Result<Vec<u8>, GatewayError> {
            let slice: Vec<KeyRecord> = self
                .records
                .iter()
                .filter(|r| r.index >= from && r.index < from + count as u64)
                .cloned()
                .collect();
            Ok(encode_packed(&slice))
        }

        async fn nonce(
            &self,
            _module: ModuleAddress,
            _block: BlockRef,
        ) -> Result<u64, GatewayError> {
            Ok(1)
        }
    }

    fn record(index: u64, used: bool) -> KeyRecord {
        KeyRecord {
            index,
            key: [30 + index as u8; 48],
            deposit_signature: [60 + index as u8; 96],
            used,
        }
    }

    #[tokio::test]
    async fn test_packed_blobs_end_up_as_stored_rows() {
        let gateway = Arc::new(PackedFixtureGateway {
            operator: operator(0, 0, 2, 5),
            records: (0..5).map(|i| record(i, i < 2)).collect(),
        });
        // Batch size below the range forces multi-chunk fetches.
        let reader = Arc::new(PackedRegistryReader::new(
            gateway,
            TransportConfig {
                max_batch_size: 2,
                ..TransportConfig::default()
            },
        ));
        let store =
            RegistryStore::new(Arc::new(InMemoryStore::new()), StorageConfig::for_testing());
        let engine = Reconciler::new(
            store.clone(),
            reader,
            ReconcilerConfig::for_testing(ReconcileMode::FullRegistry),
        );

        engine.update(module(), block(1)).await.unwrap();

        let stored = store.operator_keys(module(), 0).unwrap();
        assert_eq!(stored.len(), 5);
        for (i, key) in stored.iter().enumerate() {
            assert_eq!(key.index, i as u64);
            assert_eq!(key.key, [30 + i as u8; 48]);
            assert_eq!(key.deposit_signature, [60 + i as u8; 96]);
            assert_eq!(key.used, i < 2);
        }
        // staking_limit == total, so every slot is vetted.
        assert!(stored.iter().all(|k| k.vetted));
    }
}
