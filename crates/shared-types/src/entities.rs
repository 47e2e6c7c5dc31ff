//! # Core Domain Entities
//!
//! Defines the entities mirrored from on-chain staking modules.
//!
//! ## Clusters
//!
//! - **Registry**: `RegistryOperator`, `RegistryKey`
//! - **Snapshot metadata**: `RegistryMeta`, `BlockRef`
//! - **Deployment identity**: `AppIdentity`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

// Re-export the Ethereum-style fixed hashes used across all subsystems
pub use primitive_types::{H160, H256};

/// A 20-byte staking-module (contract) address.
pub type ModuleAddress = H160;

/// A 32-byte execution-layer block hash.
pub type BlockHash = H256;

/// A 48-byte BLS validator public key.
pub type ValidatorPublicKey = [u8; 48];

/// A 96-byte BLS deposit signature.
pub type DepositSignature = [u8; 96];

/// Reference to the block a registry read is pinned to.
///
/// Every contract read within one reconciliation pass is issued against the
/// same `BlockRef` so the fetched operators and keys form one coherent
/// chain snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Block number on the execution layer.
    pub number: u64,
    /// Hash of that block.
    pub hash: BlockHash,
    /// Unix timestamp of that block.
    pub timestamp: u64,
}

impl BlockRef {
    /// Create a block reference.
    pub fn new(number: u64, hash: BlockHash, timestamp: u64) -> Self {
        Self {
            number,
            hash,
            timestamp,
        }
    }
}

/// A node operator registered within a staking module.
///
/// Identity: `(module, index)`. Every field is fully overwritten on each
/// reconciliation pass; operators are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryOperator {
    /// Address of the staking module this operator belongs to.
    pub module: ModuleAddress,
    /// Operator index within the module's operator array.
    pub index: u64,
    /// Whether the operator is currently active.
    pub active: bool,
    /// Human-readable operator name.
    pub name: String,
    /// Address receiving this operator's rewards.
    pub reward_address: H160,
    /// Maximum number of keys the operator is approved (vetted) to use.
    pub staking_limit: u64,
    /// Number of validators the operator has stopped.
    pub stopped_validators: u64,
    /// Size of the on-chain key array, including unused/vetted keys.
    pub total_signing_keys: u64,
    /// Count of keys already consumed by a deposit.
    ///
    /// Monotonically non-decreasing in well-behaved chain history.
    pub used_signing_keys: u64,
    /// Count of used keys observed at a finalized block.
    ///
    /// `finalized_used_signing_keys <= used_signing_keys <= total_signing_keys`
    /// always holds for a well-formed snapshot.
    pub finalized_used_signing_keys: u64,
}

impl RegistryOperator {
    /// Check the counter ordering a well-formed operator snapshot must satisfy.
    pub fn counters_consistent(&self) -> bool {
        self.finalized_used_signing_keys <= self.used_signing_keys
            && self.used_signing_keys <= self.total_signing_keys
    }
}

/// A single validator key slot within an operator's key array.
///
/// Identity: `(module, operator_index, index)`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryKey {
    /// Address of the staking module.
    pub module: ModuleAddress,
    /// Index of the operator owning this key.
    pub operator_index: u64,
    /// Index of this key within the operator's key array.
    pub index: u64,
    /// The 48-byte validator public key.
    #[serde_as(as = "Bytes")]
    pub key: ValidatorPublicKey,
    /// The 96-byte deposit signature registered with the key.
    #[serde_as(as = "Bytes")]
    pub deposit_signature: DepositSignature,
    /// Whether the key has been consumed by a deposit.
    pub used: bool,
    /// Whether the key has been approved for use (vetted).
    pub vetted: bool,
}

impl RegistryKey {
    /// Hex rendering of the public key, `0x`-prefixed, for logs and lookups.
    pub fn key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key))
    }
}

/// Snapshot metadata describing the chain view a module's mirror was built
/// from. One logical row per module.
///
/// A `RegistryMeta` row is only ever written in the same transaction as the
/// operator and key rows it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryMeta {
    /// Address of the staking module.
    pub module: ModuleAddress,
    /// Block number the mirror reflects.
    pub block_number: u64,
    /// Hash of that block.
    pub block_hash: BlockHash,
    /// Unix timestamp of that block.
    pub timestamp: u64,
    /// The module's on-chain change counter (`keysOpIndex`) at that block.
    ///
    /// Informational only; reconciliation never skips work based on it.
    pub nonce: u64,
}

impl RegistryMeta {
    /// Build meta from a block reference and the nonce read at that block.
    pub fn from_block(module: ModuleAddress, block: BlockRef, nonce: u64) -> Self {
        Self {
            module,
            block_number: block.number,
            block_hash: block.hash,
            timestamp: block.timestamp,
            nonce,
        }
    }
}

/// Identity record pinning a database instance to one chain deployment.
///
/// Written on first open, compared on every later open. Prevents pointing a
/// mirror at a database that was populated for a different chain or locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Chain id of the execution layer this mirror follows.
    pub chain_id: u64,
    /// Address of the locator contract for this deployment.
    pub locator_address: H160,
}
