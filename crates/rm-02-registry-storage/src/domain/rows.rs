//! # Checksummed Row Codec
//!
//! Every persisted row is bincode-encoded and prefixed with a crc32 of the
//! payload. The checksum is verified on every read so a torn or corrupted
//! row surfaces as [`StorageError::DataCorruption`] instead of a garbled
//! deserialization.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::StorageError;

const CHECKSUM_BYTES: usize = 4;

/// Serialize a row with its integrity prefix.
pub fn encode_row<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let payload = bincode::serialize(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let mut row = Vec::with_capacity(CHECKSUM_BYTES + payload.len());
    row.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    row.extend_from_slice(&payload);
    Ok(row)
}

/// Deserialize a row, verifying its integrity prefix.
///
/// `key` is the storage key the row was read from, used only for error
/// reporting.
pub fn decode_row<T: DeserializeOwned>(key: &[u8], row: &[u8]) -> Result<T, StorageError> {
    if row.len() < CHECKSUM_BYTES {
        return Err(StorageError::DataCorruption {
            key_hex: hex::encode(key),
        });
    }
    let (checksum, payload) = row.split_at(CHECKSUM_BYTES);
    let stored = u32::from_le_bytes([checksum[0], checksum[1], checksum[2], checksum[3]]);
    if crc32fast::hash(payload) != stored {
        return Err(StorageError::DataCorruption {
            key_hex: hex::encode(key),
        });
    }
    bincode::deserialize(payload).map_err(|e| StorageError::Serialization(e.to_string()))
}
