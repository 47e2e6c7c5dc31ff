//! # Keyspace Layout
//!
//! Storage keys are built so that a plain lexicographic prefix scan returns
//! rows in the order the read API guarantees: operator index first, then key
//! index. Indices are therefore encoded big-endian.
//!
//! ```text
//! o : <module 20> <operator be8>                      -> RegistryOperator row
//! k : <module 20> <operator be8> <index be8>          -> RegistryKey row
//! m : <module 20>                                     -> RegistryMeta row
//! p : <module 20> <pubkey 48> <operator be8> <be8>    -> () (point-lookup index)
//! a : identity                                        -> AppIdentity row
//! ```

use shared_types::{ModuleAddress, ValidatorPublicKey};

const SEP: u8 = b':';

/// Storage key for the app-identity row.
pub const APP_IDENTITY_KEY: &[u8] = b"a:identity";

fn with_module(tag: u8, module: ModuleAddress, extra: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 + 20 + extra);
    key.push(tag);
    key.push(SEP);
    key.extend_from_slice(module.as_bytes());
    key
}

/// Row key for one operator.
pub fn operator_key(module: ModuleAddress, operator_index: u64) -> Vec<u8> {
    let mut key = with_module(b'o', module, 8);
    key.extend_from_slice(&operator_index.to_be_bytes());
    key
}

/// Prefix covering every operator row of a module.
pub fn operator_prefix(module: ModuleAddress) -> Vec<u8> {
    with_module(b'o', module, 0)
}

/// Row key for one signing key.
pub fn signing_key_key(module: ModuleAddress, operator_index: u64, index: u64) -> Vec<u8> {
    let mut key = with_module(b'k', module, 16);
    key.extend_from_slice(&operator_index.to_be_bytes());
    key.extend_from_slice(&index.to_be_bytes());
    key
}

/// Prefix covering every signing-key row of a module, ordered by operator
/// index then key index.
pub fn signing_key_prefix(module: ModuleAddress) -> Vec<u8> {
    with_module(b'k', module, 0)
}

/// Prefix covering one operator's signing-key rows.
pub fn operator_keys_prefix(module: ModuleAddress, operator_index: u64) -> Vec<u8> {
    let mut key = with_module(b'k', module, 8);
    key.extend_from_slice(&operator_index.to_be_bytes());
    key
}

/// Row key for a module's snapshot metadata.
pub fn meta_key(module: ModuleAddress) -> Vec<u8> {
    with_module(b'm', module, 0)
}

/// Index entry mapping a public key back to its row.
///
/// The operator and key index are part of the entry key because nothing on
/// chain stops two operators from registering the same public key.
pub fn pubkey_index_key(
    module: ModuleAddress,
    pubkey: &ValidatorPublicKey,
    operator_index: u64,
    index: u64,
) -> Vec<u8> {
    let mut key = with_module(b'p', module, 48 + 16);
    key.extend_from_slice(pubkey);
    key.extend_from_slice(&operator_index.to_be_bytes());
    key.extend_from_slice(&index.to_be_bytes());
    key
}

/// Prefix covering every index entry for one public key.
pub fn pubkey_index_prefix(module: ModuleAddress, pubkey: &ValidatorPublicKey) -> Vec<u8> {
    let mut key = with_module(b'p', module, 48);
    key.extend_from_slice(pubkey);
    key
}

/// Recover `(operator_index, index)` from a pubkey-index entry key.
pub fn parse_pubkey_index_entry(entry: &[u8]) -> Option<(u64, u64)> {
    let suffix_len = 16;
    if entry.len() < 2 + 20 + 48 + suffix_len {
        return None;
    }
    let suffix = &entry[entry.len() - suffix_len..];
    let operator_index = u64::from_be_bytes(suffix[..8].try_into().ok()?);
    let index = u64::from_be_bytes(suffix[8..].try_into().ok()?);
    Some((operator_index, index))
}
