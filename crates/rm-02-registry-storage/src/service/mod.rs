//! # Registry Store Service
//!
//! `RegistryStore` owns all persisted rows. Writers never touch rows
//! directly: a reconciliation pass stages its desired state into an
//! [`UpdateBatch`] and hands the whole thing to [`RegistryStore::commit`],
//! which applies it as one atomic backend batch.

pub mod read_api;
pub mod stream;

use std::sync::Arc;

use shared_types::{
    AppIdentity, ModuleAddress, RegistryKey, RegistryMeta, RegistryOperator,
};
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::domain::errors::StorageError;
use crate::domain::keyspace;
use crate::domain::rows::{decode_row, encode_row};
use crate::ports::outbound::{BatchOperation, KeyValueStore};

use mirror_telemetry::metrics::{KEYS_DELETED, KEYS_UPSERTED};

/// Transactional store for mirrored registry data.
pub struct RegistryStore<KV: KeyValueStore> {
    kv: Arc<KV>,
    config: StorageConfig,
}

impl<KV: KeyValueStore> Clone for RegistryStore<KV> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            config: self.config.clone(),
        }
    }
}

/// Staged writes for one reconciliation pass.
///
/// Nothing is visible to readers until the batch is committed; a dropped
/// batch has no effect.
pub struct UpdateBatch {
    module: ModuleAddress,
    operations: Vec<BatchOperation>,
    keys_upserted: u64,
    keys_deleted: u64,
    meta_staged: bool,
}

impl UpdateBatch {
    fn new(module: ModuleAddress) -> Self {
        Self {
            module,
            operations: Vec::new(),
            keys_upserted: 0,
            keys_deleted: 0,
            meta_staged: false,
        }
    }

    /// Module this batch belongs to.
    pub fn module(&self) -> ModuleAddress {
        self.module
    }

    /// Number of staged key upserts.
    pub fn keys_upserted(&self) -> u64 {
        self.keys_upserted
    }

    /// Number of staged key deletions.
    pub fn keys_deleted(&self) -> u64 {
        self.keys_deleted
    }

    /// Stage a full overwrite of an operator row.
    pub fn upsert_operator(&mut self, operator: &RegistryOperator) -> Result<(), StorageError> {
        let row = encode_row(operator)?;
        self.operations.push(BatchOperation::put(
            keyspace::operator_key(self.module, operator.index),
            row,
        ));
        Ok(())
    }

    /// Stage an upsert of a key row and its pubkey index entry.
    ///
    /// `previous` is the row currently stored at the same index, if any; it
    /// is needed to drop the old pubkey index entry when a re-read changed
    /// the public key at this index.
    pub fn upsert_key(
        &mut self,
        key: &RegistryKey,
        previous: Option<&RegistryKey>,
    ) -> Result<(), StorageError> {
        if let Some(previous) = previous {
            if previous.key != key.key {
                self.operations.push(BatchOperation::delete(
                    keyspace::pubkey_index_key(
                        self.module,
                        &previous.key,
                        previous.operator_index,
                        previous.index,
                    ),
                ));
            }
        }

        let row = encode_row(key)?;
        self.operations.push(BatchOperation::put(
            keyspace::signing_key_key(self.module, key.operator_index, key.index),
            row,
        ));
        self.operations.push(BatchOperation::put(
            keyspace::pubkey_index_key(self.module, &key.key, key.operator_index, key.index),
            Vec::new(),
        ));
        self.keys_upserted += 1;
        Ok(())
    }

    /// Stage deletion of a stored key row and its pubkey index entry.
    pub fn delete_key(&mut self, existing: &RegistryKey) {
        self.operations.push(BatchOperation::delete(
            keyspace::signing_key_key(self.module, existing.operator_index, existing.index),
        ));
        self.operations.push(BatchOperation::delete(keyspace::pubkey_index_key(
            self.module,
            &existing.key,
            existing.operator_index,
            existing.index,
        )));
        self.keys_deleted += 1;
    }

    /// Stage the snapshot metadata describing this batch.
    ///
    /// Must be staged exactly once, after all row writes, so meta and rows
    /// land in the same backend batch.
    pub fn set_meta(&mut self, meta: &RegistryMeta) -> Result<(), StorageError> {
        let row = encode_row(meta)?;
        self.operations
            .push(BatchOperation::put(keyspace::meta_key(self.module), row));
        self.meta_staged = true;
        Ok(())
    }
}

impl<KV: KeyValueStore> RegistryStore<KV> {
    /// Create a store over a key-value backend.
    pub fn new(kv: Arc<KV>, config: StorageConfig) -> Self {
        Self { kv, config }
    }

    /// Storage configuration in effect.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Begin staging an update for one module.
    pub fn begin_update(&self, module: ModuleAddress) -> UpdateBatch {
        UpdateBatch::new(module)
    }

    /// Commit a staged update as one atomic batch.
    pub fn commit(&self, batch: UpdateBatch) -> Result<(), StorageError> {
        debug_assert!(batch.meta_staged, "update committed without meta");

        let upserted = batch.keys_upserted;
        let deleted = batch.keys_deleted;
        let module = batch.module;

        self.kv.atomic_batch_write(batch.operations)?;

        KEYS_UPSERTED.inc_by(upserted);
        KEYS_DELETED.inc_by(deleted);
        info!(
            module = %module,
            keys_upserted = upserted,
            keys_deleted = deleted,
            "committed registry update"
        );
        Ok(())
    }

    /// Load one stored operator, or `None` if it was never mirrored.
    pub fn find_operator(
        &self,
        module: ModuleAddress,
        index: u64,
    ) -> Result<Option<RegistryOperator>, StorageError> {
        let key = keyspace::operator_key(module, index);
        match self.kv.get(&key)? {
            Some(row) => Ok(Some(decode_row(&key, &row)?)),
            None => Ok(None),
        }
    }

    /// Load every stored key of one operator, ordered by key index.
    pub fn operator_keys(
        &self,
        module: ModuleAddress,
        operator_index: u64,
    ) -> Result<Vec<RegistryKey>, StorageError> {
        let prefix = keyspace::operator_keys_prefix(module, operator_index);
        let rows = self.kv.prefix_scan(&prefix)?;
        let mut keys = Vec::with_capacity(rows.len());
        for (key, value) in rows {
            keys.push(decode_row(&key, &value)?);
        }
        Ok(keys)
    }

    /// Load the snapshot metadata for a module, if any pass ever committed.
    pub fn get_meta(&self, module: ModuleAddress) -> Result<Option<RegistryMeta>, StorageError> {
        let key = keyspace::meta_key(module);
        match self.kv.get(&key)? {
            Some(row) => Ok(Some(decode_row(&key, &row)?)),
            None => Ok(None),
        }
    }

    /// Read the app-identity record, if the database has one.
    pub fn read_app_identity(&self) -> Result<Option<AppIdentity>, StorageError> {
        match self.kv.get(keyspace::APP_IDENTITY_KEY)? {
            Some(row) => Ok(Some(decode_row(keyspace::APP_IDENTITY_KEY, &row)?)),
            None => Ok(None),
        }
    }

    /// Record the app identity this database belongs to.
    pub fn write_app_identity(&self, identity: &AppIdentity) -> Result<(), StorageError> {
        let row = encode_row(identity)?;
        self.kv.atomic_batch_write(vec![BatchOperation::put(
            keyspace::APP_IDENTITY_KEY,
            row,
        )])?;
        debug!(chain_id = identity.chain_id, "recorded app identity");
        Ok(())
    }

    pub(crate) fn kv(&self) -> &Arc<KV> {
        &self.kv
    }
}
