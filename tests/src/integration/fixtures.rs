//! Shared fixtures for the integration scenarios.

use std::sync::Arc;

use rm_02_registry_storage::{InMemoryStore, RegistryStore, StorageConfig};
use rm_03_reconciler::{MockRegistryReader, ReconcileMode, Reconciler, ReconcilerConfig};
use shared_types::{
    BlockHash, BlockRef, ModuleAddress, RegistryKey, RegistryOperator, H160,
};

/// The module address used by every scenario.
pub fn module() -> ModuleAddress {
    ModuleAddress::repeat_byte(0x33)
}

/// A block reference with a deterministic hash per number.
pub fn block(number: u64) -> BlockRef {
    BlockRef::new(number, BlockHash::repeat_byte((number % 251) as u8), number * 12)
}

/// An operator snapshot with `finalized <= used <= total` counters.
pub fn operator(index: u64, finalized: u64, used: u64, total: u64) -> RegistryOperator {
    RegistryOperator {
        module: module(),
        index,
        active: true,
        name: format!("operator-{index}"),
        reward_address: H160::repeat_byte(index as u8 + 1),
        staking_limit: total,
        stopped_validators: 0,
        total_signing_keys: total,
        used_signing_keys: used,
        finalized_used_signing_keys: finalized,
    }
}

/// A key whose pubkey bytes are derived from `fill`.
pub fn key(operator_index: u64, index: u64, fill: u8, used: bool) -> RegistryKey {
    RegistryKey {
        module: module(),
        operator_index,
        index,
        key: [fill; 48],
        deposit_signature: [fill.wrapping_add(1); 96],
        used,
        vetted: true,
    }
}

/// An engine over an in-memory store, plus handles to its parts.
pub struct Harness {
    pub store: RegistryStore<InMemoryStore>,
    pub reader: MockRegistryReader,
    pub engine: Reconciler<InMemoryStore, MockRegistryReader>,
}

impl Harness {
    pub fn new(mode: ReconcileMode) -> Self {
        let store =
            RegistryStore::new(Arc::new(InMemoryStore::new()), StorageConfig::for_testing());
        let reader = MockRegistryReader::new();
        let engine = Reconciler::new(
            store.clone(),
            Arc::new(reader.clone()),
            ReconcilerConfig::for_testing(mode),
        );
        Self {
            store,
            reader,
            engine,
        }
    }

    /// One operator with `total` keys filled `10 + index`, the first `used`
    /// of them consumed, the first `finalized` of those finalized.
    pub fn seed_single_operator(&self, finalized: u64, used: u64, total: u64) {
        self.reader
            .set_operators(vec![operator(0, finalized, used, total)]);
        self.reader.set_keys(
            0,
            (0..total)
                .map(|i| key(0, i, 10 + i as u8, i < used))
                .collect(),
        );
    }
}
