//! # Packed Record Codec (rm-01)
//!
//! Pure decoding of batched "read many signing keys" contract responses into
//! fixed-width key records, and the matching encoder used by tests and
//! fixtures.
//!
//! ## Supported call shapes
//!
//! The on-chain registry exposes key data in three shapes; all three are
//! normalized into the same record sequence:
//!
//! 1. **Packed blob** — one response laying out `N` public keys back to back,
//!    followed by `N` signatures, followed by `N` one-byte used flags.
//! 2. **Parallel arrays** — one response carrying a key blob (`N * 48`), a
//!    signature blob (`N * 96`) and an already-decoded used-flag array,
//!    sliced at `i * 48` / `i * 96` boundaries.
//! 3. **Single-record calls** — `N` separate responses of one key each.
//!
//! ## Failure policy
//!
//! Decoding fails fast. A blob whose length is not an exact multiple of the
//! expected stride, an empty batch, or an inverted index range is an error;
//! the decoder never returns a truncated or garbled sequence.

pub mod error;
pub mod packed;

pub use error::CodecError;
pub use packed::{
    check_range, decode_packed, decode_parallel, decode_single, encode_packed, KeyRecord,
    PUBLIC_KEY_BYTES, RECORD_STRIDE, SIGNATURE_BYTES, USED_FLAG_BYTES,
};
