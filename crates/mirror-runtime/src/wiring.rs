//! # Runtime Wiring
//!
//! Assembles the mirror from its parts: RocksDB backend, registry store,
//! identity guard, packed reader over an injected gateway, reconciler, and
//! the polling loop.

use std::sync::Arc;

use rm_02_registry_storage::{KvError, RegistryStore};
use rm_03_reconciler::adapters::PackedRegistryReader;
use rm_03_reconciler::ports::outbound::ContractGateway;
use rm_03_reconciler::Reconciler;
use rm_04_poller::{BlockSource, PollerConfig, PollerHandle, RegistryPoller, Subscription};
use thiserror::Error;

use crate::adapters::rocksdb_store::RocksDbStore;
use crate::config::{ConfigError, RuntimeConfig};
use crate::identity::{enforce_identity, IdentityGuardError};

/// Errors raised while assembling the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Identity(#[from] IdentityGuardError),

    /// The database could not be opened.
    #[error(transparent)]
    Backend(#[from] KvError),
}

/// A fully wired mirror.
///
/// The chain transport is injected: `G` turns contract calls into typed
/// reads, `B` resolves the head block each tick. Both come from the
/// embedding binary.
pub struct MirrorRuntime<G, B> {
    store: RegistryStore<RocksDbStore>,
    reconciler: Arc<Reconciler<RocksDbStore, PackedRegistryReader<G>>>,
    poller: Arc<RegistryPoller<RocksDbStore, PackedRegistryReader<G>, B>>,
}

impl<G, B> MirrorRuntime<G, B>
where
    G: ContractGateway + 'static,
    B: BlockSource + 'static,
{
    /// Open storage, enforce the deployment identity, and wire everything.
    pub fn build(
        config: RuntimeConfig,
        gateway: Arc<G>,
        blocks: Arc<B>,
    ) -> Result<Self, RuntimeError> {
        let kv = Arc::new(RocksDbStore::open(config.db.clone())?);
        let store = RegistryStore::new(kv, config.storage.clone());
        enforce_identity(&store, &config.identity)?;

        let reader = Arc::new(PackedRegistryReader::new(gateway, config.transport.clone()));
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            reader,
            config.reconciler.clone(),
        ));
        let poller = Arc::new(RegistryPoller::new(
            Arc::clone(&reconciler),
            blocks,
            PollerConfig::new(config.schedule.clone(), config.modules.clone()),
        ));

        Ok(Self {
            store,
            reconciler,
            poller,
        })
    }

    /// The registry store, for serving the read API.
    pub fn store(&self) -> &RegistryStore<RocksDbStore> {
        &self.store
    }

    /// The reconciler, for one-shot manual passes.
    pub fn reconciler(&self) -> &Arc<Reconciler<RocksDbStore, PackedRegistryReader<G>>> {
        &self.reconciler
    }

    /// Subscribe to outcomes of future poll ticks.
    pub fn subscribe(&self) -> Subscription {
        self.poller.subscribe()
    }

    /// Start the polling loop on the current runtime.
    pub fn start(&self) -> PollerHandle {
        Arc::clone(&self.poller).spawn()
    }
}
