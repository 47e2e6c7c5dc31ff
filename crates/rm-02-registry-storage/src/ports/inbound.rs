//! # Inbound Ports (Driving Ports)
//!
//! The read API exposed to the presentation layer.
//!
//! Every read returns the snapshot metadata alongside the rows; `meta` is
//! `None` until the first reconciliation commit for the module, which
//! signals "not ready yet" rather than an empty-but-valid mirror.

use shared_types::{ModuleAddress, RegistryKey, RegistryMeta, RegistryOperator, ValidatorPublicKey};

use crate::domain::errors::StorageError;
use crate::service::stream::KeyStream;

/// Row filter for key reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyFilter {
    /// Keep only keys with this used flag.
    pub used: Option<bool>,
    /// Keep only keys of this operator.
    pub operator_index: Option<u64>,
}

impl KeyFilter {
    /// Whether a key passes the filter.
    pub fn matches(&self, key: &RegistryKey) -> bool {
        if let Some(used) = self.used {
            if key.used != used {
                return false;
            }
        }
        if let Some(operator_index) = self.operator_index {
            if key.operator_index != operator_index {
                return false;
            }
        }
        true
    }
}

/// Read API over the mirrored registry.
pub trait RegistryReadApi {
    /// All operators of a module, ordered by operator index.
    fn get_operators(
        &self,
        module: ModuleAddress,
    ) -> Result<(Vec<RegistryOperator>, Option<RegistryMeta>), StorageError>;

    /// All keys of a module matching `filter`, ordered by operator index
    /// then key index.
    fn get_keys(
        &self,
        module: ModuleAddress,
        filter: KeyFilter,
    ) -> Result<(Vec<RegistryKey>, Option<RegistryMeta>), StorageError>;

    /// Point lookup by public key.
    ///
    /// Returns every stored row carrying one of the requested pubkeys (two
    /// operators can register the same key).
    fn get_keys_by_pubkeys(
        &self,
        module: ModuleAddress,
        pubkeys: &[ValidatorPublicKey],
    ) -> Result<(Vec<RegistryKey>, Option<RegistryMeta>), StorageError>;

    /// Lazy, forward-only export of every key of a module.
    ///
    /// The whole export is served from one consistent read view. A consumer
    /// that stalls past the configured inactivity window sees a terminal
    /// [`StorageError::StreamTimeout`].
    fn stream_all_keys(&self, module: ModuleAddress) -> KeyStream;
}
