//! # Codec Errors

use thiserror::Error;

/// Errors raised while decoding batched key-record responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Response length does not match the expected record stride.
    #[error("malformed response: expected {expected} bytes for {count} records, got {actual}")]
    MalformedResponse {
        /// Byte length the batch should have had.
        expected: usize,
        /// Byte length actually received.
        actual: usize,
        /// Number of records requested.
        count: usize,
    },

    /// A used-flag byte was neither 0 nor 1.
    #[error("malformed response: used flag at record {index} is {value:#04x}, expected 0 or 1")]
    MalformedUsedFlag {
        /// Record position within the batch.
        index: usize,
        /// The offending flag byte.
        value: u8,
    },

    /// A batch of zero records was requested.
    #[error("empty batch: record count must be positive")]
    EmptyBatch,

    /// An inverted key-index range was requested.
    #[error("invalid range: from_index {from} > to_index {to}")]
    InvalidRange {
        /// Inclusive start of the requested range.
        from: u64,
        /// Exclusive end of the requested range.
        to: u64,
    },
}
