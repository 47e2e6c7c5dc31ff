//! Outbound adapters.

pub mod packed_reader;

pub use packed_reader::PackedRegistryReader;
