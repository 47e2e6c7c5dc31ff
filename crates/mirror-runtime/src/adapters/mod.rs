//! Production storage adapters.

pub mod rocksdb_store;
