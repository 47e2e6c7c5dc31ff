//! # Database Identity Guard
//!
//! A mirror database is only valid for the deployment it was populated
//! from. The guard writes an [`AppIdentity`] row on first open and refuses
//! every later open whose configured identity differs, before any
//! reconciliation can mix data from two chains.

use rm_02_registry_storage::{KeyValueStore, RegistryStore, StorageError};
use shared_types::{AppIdentity, IdentityError};
use thiserror::Error;
use tracing::info;

/// Outcome of a failed identity check.
#[derive(Debug, Error)]
pub enum IdentityGuardError {
    #[error(transparent)]
    Mismatch(#[from] IdentityError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Pin the database to `configured`, or fail if it is already pinned to a
/// different deployment.
pub fn enforce_identity<KV: KeyValueStore>(
    store: &RegistryStore<KV>,
    configured: &AppIdentity,
) -> Result<(), IdentityGuardError> {
    match store.read_app_identity()? {
        None => {
            store.write_app_identity(configured)?;
            info!(
                chain_id = configured.chain_id,
                locator = %configured.locator_address,
                "pinned fresh database to deployment identity"
            );
            Ok(())
        }
        Some(stored) if stored == *configured => Ok(()),
        Some(stored) => Err(IdentityError::Mismatch {
            stored,
            configured: configured.clone(),
        }
        .into()),
    }
}
