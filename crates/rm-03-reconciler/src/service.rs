//! # Reconciliation Service
//!
//! One `update` call brings the stored mirror of a module to the chain
//! state at a caller-supplied block, as a single atomic commit. Everything
//! below the safe boundary is trusted and never re-read; everything at or
//! above it is fetched fresh, and stored indices past the fetched end are
//! deleted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use mirror_telemetry::metrics::{UPDATES_TOTAL, UPDATE_DURATION, UPDATE_FAILURES};
use parking_lot::Mutex;
use rm_02_registry_storage::{KeyValueStore, RegistryStore};
use shared_types::{BlockRef, ModuleAddress, RegistryKey, RegistryMeta, RegistryOperator, SnapshotError};
use tracing::{debug, error, info, warn};

use crate::config::ReconcilerConfig;
use crate::domain::boundary::{compute_range, KeyRange};
use crate::domain::errors::ReconcileError;
use crate::ports::outbound::{ReaderError, RegistryReader};

/// Per-operator work item for one pass.
struct OperatorPlan {
    fetched: RegistryOperator,
    stored_keys: Vec<RegistryKey>,
    range: KeyRange,
    new_keys: Vec<RegistryKey>,
}

/// Reconciles one or more modules against the chain.
///
/// Updates for different modules run independently; updates for the same
/// module are serialized on a per-module lock. [`Reconciler::update`] waits
/// for the lock, [`Reconciler::try_update`] refuses with
/// [`ReconcileError::InFlight`] instead.
pub struct Reconciler<KV: KeyValueStore, R> {
    store: RegistryStore<KV>,
    reader: Arc<R>,
    config: ReconcilerConfig,
    module_locks: Mutex<HashMap<ModuleAddress, Arc<tokio::sync::Mutex<()>>>>,
}

impl<KV, R> Reconciler<KV, R>
where
    KV: KeyValueStore,
    R: RegistryReader,
{
    pub fn new(store: RegistryStore<KV>, reader: Arc<R>, config: ReconcilerConfig) -> Self {
        Self {
            store,
            reader,
            config,
            module_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The stored snapshot metadata for a module, if any pass ever
    /// committed. `None` means the mirror is empty for this module.
    pub fn last_meta(&self, module: ModuleAddress) -> Result<Option<RegistryMeta>, ReconcileError> {
        Ok(self.store.get_meta(module)?)
    }

    fn module_lock(&self, module: ModuleAddress) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(
            self.module_locks
                .lock()
                .entry(module)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    /// Run one reconciliation pass for a module at a block.
    ///
    /// Waits if another update for the same module is already running.
    pub async fn update(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<RegistryMeta, ReconcileError> {
        let lock = self.module_lock(module);
        let _guard = lock.lock().await;
        self.run_pass(module, block).await
    }

    /// Like [`update`](Self::update), but refuses instead of waiting when an
    /// update for the same module is already in flight.
    pub async fn try_update(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<RegistryMeta, ReconcileError> {
        let lock = self.module_lock(module);
        let _guard = lock
            .try_lock()
            .map_err(|_| ReconcileError::InFlight { module })?;
        self.run_pass(module, block).await
    }

    async fn run_pass(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<RegistryMeta, ReconcileError> {
        let started = Instant::now();
        let result = self.reconcile(module, block).await;
        match &result {
            Ok(meta) => {
                UPDATES_TOTAL.inc();
                UPDATE_DURATION.observe(started.elapsed().as_secs_f64());
                info!(
                    module = %module,
                    block = meta.block_number,
                    nonce = meta.nonce,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "reconciliation pass committed"
                );
            }
            Err(err) => {
                UPDATE_FAILURES.with_label_values(&[err.reason()]).inc();
                if err.is_invariant_violation() {
                    error!(
                        module = %module,
                        block = block.number,
                        reason = err.reason(),
                        error = %err,
                        "reconciliation pass aborted on inconsistent key range"
                    );
                } else {
                    warn!(
                        module = %module,
                        block = block.number,
                        reason = err.reason(),
                        error = %err,
                        "reconciliation pass failed"
                    );
                }
            }
        }
        result
    }

    async fn reconcile(
        &self,
        module: ModuleAddress,
        block: BlockRef,
    ) -> Result<RegistryMeta, ReconcileError> {
        let operators = self.reader.list_operators(module, block).await?;
        for op in &operators {
            if !op.counters_consistent() {
                return Err(SnapshotError::InconsistentCounters {
                    operator_index: op.index,
                    finalized: op.finalized_used_signing_keys,
                    used: op.used_signing_keys,
                    total: op.total_signing_keys,
                }
                .into());
            }
        }
        let nonce = self.reader.current_nonce(module, block).await?;

        // Plan against the stored state before any fetch.
        let mut plans = Vec::with_capacity(operators.len());
        for fetched in operators {
            let previous = self.store.find_operator(module, fetched.index)?;
            let stored_keys = self.store.operator_keys(module, fetched.index)?;
            let range = compute_range(previous.as_ref(), &fetched, self.config.mode);
            debug!(
                module = %module,
                operator = fetched.index,
                from = range.from,
                to = range.to,
                stored = stored_keys.len(),
                "planned operator range"
            );
            plans.push(OperatorPlan {
                fetched,
                stored_keys,
                range,
                new_keys: Vec::new(),
            });
        }

        // Fetch phase: bounded concurrency across operators.
        let plans: Vec<OperatorPlan> = stream::iter(plans)
            .map(|mut plan| {
                let reader = Arc::clone(&self.reader);
                async move {
                    if !plan.range.is_empty() {
                        let keys = reader
                            .read_keys(
                                module,
                                plan.fetched.index,
                                plan.range.from,
                                plan.range.to,
                                block,
                            )
                            .await?;
                        if keys.len() as u64 != plan.range.len() {
                            return Err(ReconcileError::Remote(ReaderError::Network(format!(
                                "operator {} returned {} records for a range of {}",
                                plan.fetched.index,
                                keys.len(),
                                plan.range.len()
                            ))));
                        }
                        plan.new_keys = keys;
                    }
                    Ok::<OperatorPlan, ReconcileError>(plan)
                }
            })
            .buffered(self.config.fetch_concurrency.max(1))
            .try_collect()
            .await?;

        // Staging phase: everything lands in one batch or not at all.
        let mut batch = self.store.begin_update(module);
        for plan in &plans {
            let stored_by_index: HashMap<u64, &RegistryKey> =
                plan.stored_keys.iter().map(|k| (k.index, k)).collect();

            for key in &plan.new_keys {
                batch.upsert_key(key, stored_by_index.get(&key.index).copied())?;
            }
            for stale in plan.stored_keys.iter().filter(|k| k.index >= plan.range.to) {
                batch.delete_key(stale);
            }
            batch.upsert_operator(&plan.fetched)?;
        }

        let meta = RegistryMeta::from_block(module, block, nonce);
        batch.set_meta(&meta)?;
        self.store.commit(batch)?;
        Ok(meta)
    }
}
