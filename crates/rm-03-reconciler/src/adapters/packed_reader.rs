//! # Packed Registry Reader
//!
//! Adapts a raw [`ContractGateway`] into the typed [`RegistryReader`] port.
//! Key batches arrive as one packed blob per chunk and are decoded with the
//! record codec; chunks never exceed the transport's `max_batch_size`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use parking_lot::Mutex;
use rm_01_record_codec::{check_range, decode_packed};
use shared_types::{BlockRef, ModuleAddress, RegistryKey, RegistryOperator};
use tracing::debug;

use crate::config::TransportConfig;
use crate::ports::outbound::{ContractGateway, GatewayError, ReaderError, RegistryReader};

impl From<GatewayError> for ReaderError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(msg) => ReaderError::Network(msg),
        }
    }
}

/// [`RegistryReader`] over a batched contract gateway.
///
/// Caches each operator's `staking_limit` from the most recent
/// `list_operators` call. The packed record carries no vetted flag, so the
/// reader derives it: a key slot below the operator's staking limit is
/// vetted. Until the limit is known the used flag is carried as a
/// conservative stand-in.
pub struct PackedRegistryReader<G> {
    gateway: Arc<G>,
    config: TransportConfig,
    staking_limits: Mutex<HashMap<(ModuleAddress, u64), u64>>,
}

impl<G: ContractGateway> PackedRegistryReader<G> {
    pub fn new(gateway: Arc<G>, config: TransportConfig) -> Self {
        Self {
            gateway,
            config,
            staking_limits: Mutex::new(HashMap::new()),
        }
    }

    fn vetted(&self, module: ModuleAddress, operator_index: u64, key_index: u64, used: bool) -> bool {
        match self.staking_limits.lock().get(&(module, operator_index)) {
            Some(limit) => key_index < *limit,
            None => used,
        }
    }

    /// Split `[from, to)` into gateway-sized chunks as `(from, count)` pairs.
    fn chunks(&self, from: u64, to: u64) -> Vec<(u64, usize)> {
        let mut out = Vec::new();
        let mut cursor = from;
        while cursor < to {
            let count = ((to - cursor) as usize).min(self.config.max_batch_size);
            out.push((cursor, count));
            cursor += count as u64;
        }
        out
    }
}

#[async_trait]
impl<G: ContractGateway> RegistryReader for PackedRegistryReader<G> {
    async fn list_operators(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<Vec<RegistryOperator>, ReaderError> {
        let count = self.gateway.operator_count(module, block).await?;

        let operators: Vec<RegistryOperator> = stream::iter(0..count)
            .map(|index| {
                let gateway = Arc::clone(&self.gateway);
                async move { gateway.operator_at(module, index, block).await }
            })
            .buffered(self.config.max_concurrent_requests)
            .try_collect()
            .await?;

        let mut limits = self.staking_limits.lock();
        for op in &operators {
            limits.insert((module, op.index), op.staking_limit);
        }
        Ok(operators)
    }

    async fn read_keys(
        &self,
        module: ModuleAddress,
        operator_index: u64,
        from: u64,
        to: u64,
        block: BlockRef,
    ) -> Result<Vec<RegistryKey>, ReaderError> {
        let total = check_range(from, to)?;
        if total == 0 {
            return Ok(Vec::new());
        }

        let chunks = self.chunks(from, to);
        debug!(
            module = %module,
            operator = operator_index,
            from,
            to,
            chunks = chunks.len(),
            "fetching packed key batches"
        );

        // `buffered` preserves chunk order, so the result stays index-sorted.
        let batches: Vec<Vec<rm_01_record_codec::KeyRecord>> = stream::iter(chunks)
            .map(|(chunk_from, count)| {
                let gateway = Arc::clone(&self.gateway);
                async move {
                    let blob = gateway
                        .signing_keys_batch(module, operator_index, chunk_from, count, block)
                        .await?;
                    decode_packed(&blob, count, chunk_from).map_err(ReaderError::Decode)
                }
            })
            .buffered(self.config.max_concurrent_requests)
            .try_collect()
            .await?;

        let mut keys = Vec::with_capacity(total);
        for record in batches.into_iter().flatten() {
            let vetted = self.vetted(module, operator_index, record.index, record.used);
            keys.push(RegistryKey {
                module,
                operator_index,
                index: record.index,
                key: record.key,
                deposit_signature: record.deposit_signature,
                used: record.used,
                vetted,
            });
        }
        Ok(keys)
    }

    async fn current_nonce(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<u64, ReaderError> {
        Ok(self.gateway.nonce(module, block).await?)
    }
}
