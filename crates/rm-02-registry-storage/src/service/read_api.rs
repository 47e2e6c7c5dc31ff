//! # Read API Implementation
//!
//! Implements [`RegistryReadApi`] for [`RegistryStore`]. Every method reads
//! meta and rows inside one consistent read view, so a commit racing the
//! read can never produce meta from block N next to rows from block N-1.

use shared_types::{ModuleAddress, RegistryKey, RegistryMeta, RegistryOperator, ValidatorPublicKey};

use crate::domain::errors::StorageError;
use crate::domain::keyspace;
use crate::domain::rows::decode_row;
use crate::ports::inbound::{KeyFilter, RegistryReadApi};
use crate::ports::outbound::{KeyValueStore, ReadView, ScanControl};
use crate::service::stream::KeyStream;
use crate::service::RegistryStore;

fn meta_in_view(
    view: &dyn ReadView,
    module: ModuleAddress,
) -> Result<Option<RegistryMeta>, StorageError> {
    let key = keyspace::meta_key(module);
    match view.get(&key)? {
        Some(row) => Ok(Some(decode_row(&key, &row)?)),
        None => Ok(None),
    }
}

fn collect_rows<T, F>(
    view: &dyn ReadView,
    prefix: &[u8],
    mut keep: F,
) -> Result<Vec<T>, StorageError>
where
    T: serde::de::DeserializeOwned,
    F: FnMut(&T) -> bool,
{
    let mut rows = Vec::new();
    let mut decode_err: Option<StorageError> = None;
    view.scan_prefix(prefix, &mut |key, value| match decode_row::<T>(key, value) {
        Ok(row) => {
            if keep(&row) {
                rows.push(row);
            }
            ScanControl::Continue
        }
        Err(e) => {
            decode_err = Some(e);
            ScanControl::Stop
        }
    })?;
    if let Some(e) = decode_err {
        return Err(e);
    }
    Ok(rows)
}

impl<KV: KeyValueStore> RegistryStore<KV> {
    fn read_consistent<T>(
        &self,
        f: impl Fn(&dyn ReadView) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut out: Option<Result<T, StorageError>> = None;
        self.kv().with_read_view(&mut |view| {
            out = Some(f(view));
        })?;
        match out {
            Some(result) => result,
            // The adapter never skips the closure on success.
            None => Err(StorageError::Backend("read view produced no result".into())),
        }
    }
}

impl<KV: KeyValueStore> RegistryReadApi for RegistryStore<KV> {
    fn get_operators(
        &self,
        module: ModuleAddress,
    ) -> Result<(Vec<RegistryOperator>, Option<RegistryMeta>), StorageError> {
        self.read_consistent(|view| {
            let meta = meta_in_view(view, module)?;
            let operators =
                collect_rows::<RegistryOperator, _>(view, &keyspace::operator_prefix(module), |_| {
                    true
                })?;
            Ok((operators, meta))
        })
    }

    fn get_keys(
        &self,
        module: ModuleAddress,
        filter: KeyFilter,
    ) -> Result<(Vec<RegistryKey>, Option<RegistryMeta>), StorageError> {
        // A narrower prefix when the filter pins one operator.
        let prefix = match filter.operator_index {
            Some(operator_index) => keyspace::operator_keys_prefix(module, operator_index),
            None => keyspace::signing_key_prefix(module),
        };
        self.read_consistent(|view| {
            let meta = meta_in_view(view, module)?;
            let keys = collect_rows::<RegistryKey, _>(view, &prefix, |key| filter.matches(key))?;
            Ok((keys, meta))
        })
    }

    fn get_keys_by_pubkeys(
        &self,
        module: ModuleAddress,
        pubkeys: &[ValidatorPublicKey],
    ) -> Result<(Vec<RegistryKey>, Option<RegistryMeta>), StorageError> {
        self.read_consistent(|view| {
            let meta = meta_in_view(view, module)?;
            let mut keys = Vec::new();
            for pubkey in pubkeys {
                let prefix = keyspace::pubkey_index_prefix(module, pubkey);
                let mut locations = Vec::new();
                view.scan_prefix(&prefix, &mut |entry, _| {
                    if let Some(location) = keyspace::parse_pubkey_index_entry(entry) {
                        locations.push(location);
                    }
                    ScanControl::Continue
                })?;
                for (operator_index, index) in locations {
                    let row_key = keyspace::signing_key_key(module, operator_index, index);
                    if let Some(row) = view.get(&row_key)? {
                        keys.push(decode_row::<RegistryKey>(&row_key, &row)?);
                    }
                }
            }
            keys.sort_by_key(|k| (k.operator_index, k.index));
            Ok((keys, meta))
        })
    }

    fn stream_all_keys(&self, module: ModuleAddress) -> KeyStream {
        KeyStream::spawn(
            std::sync::Arc::clone(self.kv()),
            module,
            self.config().clone(),
        )
    }
}
