//! # Packed Record Decoding
//!
//! The registry contract packs key records without padding: all public keys
//! first, then all signatures, then all used flags. Offsets are therefore
//! pure multiples of the field widths and a length check up front is enough
//! to guarantee every slice below is in bounds.

use shared_types::{DepositSignature, ValidatorPublicKey};

use crate::error::CodecError;

/// Width of one packed public key.
pub const PUBLIC_KEY_BYTES: usize = 48;

/// Width of one packed deposit signature.
pub const SIGNATURE_BYTES: usize = 96;

/// Width of one packed used flag.
pub const USED_FLAG_BYTES: usize = 1;

/// Total bytes one record contributes to a packed blob.
pub const RECORD_STRIDE: usize = PUBLIC_KEY_BYTES + SIGNATURE_BYTES + USED_FLAG_BYTES;

/// One decoded key record.
///
/// `index` is the key's position in the operator's on-chain key array,
/// assigned from the `from_index` the batch was requested at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Absolute key index within the operator's key array.
    pub index: u64,
    /// The 48-byte validator public key.
    pub key: ValidatorPublicKey,
    /// The 96-byte deposit signature.
    pub deposit_signature: DepositSignature,
    /// Whether the key has been consumed by a deposit.
    pub used: bool,
}

/// Validate a half-open key-index range and return its record count.
///
/// `to` is exclusive. An inverted range is a contract-state or programming
/// inconsistency and fails loudly; an empty range is valid and yields zero.
pub fn check_range(from: u64, to: u64) -> Result<usize, CodecError> {
    if from > to {
        return Err(CodecError::InvalidRange { from, to });
    }
    Ok((to - from) as usize)
}

/// Decode one packed blob into `count` records starting at `from_index`.
///
/// Layout: `count * 48` key bytes, then `count * 96` signature bytes, then
/// `count` flag bytes.
pub fn decode_packed(
    blob: &[u8],
    count: usize,
    from_index: u64,
) -> Result<Vec<KeyRecord>, CodecError> {
    if count == 0 {
        return Err(CodecError::EmptyBatch);
    }

    let expected = count * RECORD_STRIDE;
    if blob.len() != expected {
        return Err(CodecError::MalformedResponse {
            expected,
            actual: blob.len(),
            count,
        });
    }

    let keys_end = count * PUBLIC_KEY_BYTES;
    let sigs_end = keys_end + count * SIGNATURE_BYTES;
    let (keys, rest) = blob.split_at(keys_end);
    let (signatures, flags) = rest.split_at(sigs_end - keys_end);

    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        records.push(KeyRecord {
            index: from_index + i as u64,
            key: slice_key(keys, i),
            deposit_signature: slice_signature(signatures, i),
            used: decode_flag(flags[i], i)?,
        });
    }
    Ok(records)
}

/// Decode parallel fixed-stride arrays into records starting at `from_index`.
///
/// The record count is taken from the used-flag array; the key and signature
/// blobs must match it exactly.
pub fn decode_parallel(
    keys: &[u8],
    signatures: &[u8],
    used: &[bool],
    from_index: u64,
) -> Result<Vec<KeyRecord>, CodecError> {
    let count = used.len();
    if count == 0 {
        return Err(CodecError::EmptyBatch);
    }
    if keys.len() != count * PUBLIC_KEY_BYTES {
        return Err(CodecError::MalformedResponse {
            expected: count * PUBLIC_KEY_BYTES,
            actual: keys.len(),
            count,
        });
    }
    if signatures.len() != count * SIGNATURE_BYTES {
        return Err(CodecError::MalformedResponse {
            expected: count * SIGNATURE_BYTES,
            actual: signatures.len(),
            count,
        });
    }

    let mut records = Vec::with_capacity(count);
    for (i, &flag) in used.iter().enumerate() {
        records.push(KeyRecord {
            index: from_index + i as u64,
            key: slice_key(keys, i),
            deposit_signature: slice_signature(signatures, i),
            used: flag,
        });
    }
    Ok(records)
}

/// Decode one single-record response at an absolute index.
pub fn decode_single(
    key: &[u8],
    signature: &[u8],
    used: bool,
    index: u64,
) -> Result<KeyRecord, CodecError> {
    if key.len() != PUBLIC_KEY_BYTES {
        return Err(CodecError::MalformedResponse {
            expected: PUBLIC_KEY_BYTES,
            actual: key.len(),
            count: 1,
        });
    }
    if signature.len() != SIGNATURE_BYTES {
        return Err(CodecError::MalformedResponse {
            expected: SIGNATURE_BYTES,
            actual: signature.len(),
            count: 1,
        });
    }

    Ok(KeyRecord {
        index,
        key: slice_key(key, 0),
        deposit_signature: slice_signature(signature, 0),
        used,
    })
}

/// Encode records into the packed blob layout.
///
/// Inverse of [`decode_packed`]: for any well-formed blob, decoding then
/// encoding reproduces the original bytes.
pub fn encode_packed(records: &[KeyRecord]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(records.len() * RECORD_STRIDE);
    for record in records {
        blob.extend_from_slice(&record.key);
    }
    for record in records {
        blob.extend_from_slice(&record.deposit_signature);
    }
    for record in records {
        blob.push(u8::from(record.used));
    }
    blob
}

fn slice_key(keys: &[u8], i: usize) -> ValidatorPublicKey {
    let mut key = [0u8; PUBLIC_KEY_BYTES];
    key.copy_from_slice(&keys[i * PUBLIC_KEY_BYTES..(i + 1) * PUBLIC_KEY_BYTES]);
    key
}

fn slice_signature(signatures: &[u8], i: usize) -> DepositSignature {
    let mut signature = [0u8; SIGNATURE_BYTES];
    signature.copy_from_slice(&signatures[i * SIGNATURE_BYTES..(i + 1) * SIGNATURE_BYTES]);
    signature
}

fn decode_flag(value: u8, index: usize) -> Result<bool, CodecError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::MalformedUsedFlag {
            index,
            value: other,
        }),
    }
}
