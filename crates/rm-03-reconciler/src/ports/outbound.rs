//! # Outbound Ports
//!
//! Traits for the chain-facing collaborators (registry reader, raw contract
//! gateway), plus the mock reader used across the test suites.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rm_01_record_codec::CodecError;
use shared_types::{BlockRef, ModuleAddress, RegistryKey, RegistryOperator};
use thiserror::Error;

/// Errors from the remote registry reader.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReaderError {
    /// Transport-level failure (network, timeout, RPC error).
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be decoded into key records.
    #[error(transparent)]
    Decode(#[from] CodecError),
}

/// Remote registry reader - outbound port.
///
/// All three reads are issued against an explicit [`BlockRef`] so one
/// reconciliation pass sees a single coherent chain state. Retry and
/// backoff policy belongs to the transport below this trait.
#[async_trait]
pub trait RegistryReader: Send + Sync {
    /// Current operator list of a module at a block.
    async fn list_operators(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<Vec<RegistryOperator>, ReaderError>;

    /// Key records `[from, to)` of one operator at a block. `to` is
    /// exclusive; an inverted range fails.
    async fn read_keys(
        &self,
        module: ModuleAddress,
        operator_index: u64,
        from: u64,
        to: u64,
        block: BlockRef,
    ) -> Result<Vec<RegistryKey>, ReaderError>;

    /// The module's change counter (`keysOpIndex`) at a block.
    async fn current_nonce(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<u64, ReaderError>;
}

/// Errors from the raw contract gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport-level failure.
    #[error("gateway error: {0}")]
    Transport(String),
}

/// Raw contract gateway - outbound port.
///
/// The shape of the batched JSON-RPC transport: typed operator reads plus
/// the packed byte blob for key batches. `PackedRegistryReader` adapts this
/// into [`RegistryReader`] using the record codec.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Number of operators registered in the module.
    async fn operator_count(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<u64, GatewayError>;

    /// One operator snapshot by index.
    async fn operator_at(
        &self,
        module: ModuleAddress,
        index: u64,
        block: BlockRef,
    ) -> Result<RegistryOperator, GatewayError>;

    /// The packed blob for `count` key records starting at `from`:
    /// `count * 48` key bytes, `count * 96` signature bytes, `count` flags.
    async fn signing_keys_batch(
        &self,
        module: ModuleAddress,
        operator_index: u64,
        from: u64,
        count: usize,
        block: BlockRef,
    ) -> Result<Vec<u8>, GatewayError>;

    /// The module's change counter at a block.
    async fn nonce(&self, module: ModuleAddress, block: BlockRef) -> Result<u64, GatewayError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

#[derive(Default)]
struct MockChainState {
    operators: Vec<RegistryOperator>,
    /// Key arrays by operator index.
    keys: HashMap<u64, Vec<RegistryKey>>,
    nonce: u64,
    should_fail: bool,
    /// Every `[from, to)` range requested, by operator index.
    requested_ranges: Vec<(u64, u64, u64)>,
}

/// Mock registry reader for testing.
///
/// Serves an in-memory chain state and records every key range requested,
/// so tests can assert which indices were (not) re-read.
#[derive(Clone, Default)]
pub struct MockRegistryReader {
    state: Arc<Mutex<MockChainState>>,
}

impl MockRegistryReader {
    /// Create an empty mock chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the operator list.
    pub fn set_operators(&self, operators: Vec<RegistryOperator>) {
        self.state.lock().operators = operators;
    }

    /// Replace one operator's key array.
    pub fn set_keys(&self, operator_index: u64, keys: Vec<RegistryKey>) {
        self.state.lock().keys.insert(operator_index, keys);
    }

    /// Overwrite a single key slot in place (reorged-chain simulation).
    pub fn replace_key(&self, operator_index: u64, index: u64, key: RegistryKey) {
        let mut state = self.state.lock();
        if let Some(keys) = state.keys.get_mut(&operator_index) {
            if let Some(slot) = keys.iter_mut().find(|k| k.index == index) {
                *slot = key;
            }
        }
    }

    /// Set the module nonce.
    pub fn set_nonce(&self, nonce: u64) {
        self.state.lock().nonce = nonce;
    }

    /// Make every call fail with a network error.
    pub fn set_should_fail(&self, fail: bool) {
        self.state.lock().should_fail = fail;
    }

    /// Ranges requested via `read_keys` so far, as `(operator, from, to)`.
    pub fn requested_ranges(&self) -> Vec<(u64, u64, u64)> {
        self.state.lock().requested_ranges.clone()
    }

    /// Forget recorded ranges.
    pub fn clear_requested_ranges(&self) {
        self.state.lock().requested_ranges.clear();
    }
}

#[async_trait]
impl RegistryReader for MockRegistryReader {
    async fn list_operators(
        &self,
        _module: ModuleAddress,
        _block: BlockRef,
    ) -> Result<Vec<RegistryOperator>, ReaderError> {
        let state = self.state.lock();
        if state.should_fail {
            return Err(ReaderError::Network("mock failure".to_string()));
        }
        Ok(state.operators.clone())
    }

    async fn read_keys(
        &self,
        _module: ModuleAddress,
        operator_index: u64,
        from: u64,
        to: u64,
        _block: BlockRef,
    ) -> Result<Vec<RegistryKey>, ReaderError> {
        let mut state = self.state.lock();
        if state.should_fail {
            return Err(ReaderError::Network("mock failure".to_string()));
        }
        state.requested_ranges.push((operator_index, from, to));
        if from > to {
            return Err(ReaderError::Decode(CodecError::InvalidRange { from, to }));
        }
        let keys = state.keys.get(&operator_index).cloned().unwrap_or_default();
        Ok(keys
            .into_iter()
            .filter(|k| k.index >= from && k.index < to)
            .collect())
    }

    async fn current_nonce(
        &self,
        _module: ModuleAddress,
        _block: BlockRef,
    ) -> Result<u64, ReaderError> {
        let state = self.state.lock();
        if state.should_fail {
            return Err(ReaderError::Network("mock failure".to_string()));
        }
        Ok(state.nonce)
    }
}
