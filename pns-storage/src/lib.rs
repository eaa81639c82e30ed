//! Storage abstraction for the Push Name Service.
//!
//! Provides a [`KvStore`](traits::KvStore) trait with memory, SQLite, and RocksDB
//! backends, the persisted key layout in [`keys`], and typed read access to the
//! name service tables through [`NameStore`](name_store::NameStore).

pub mod error;
pub mod keys;
pub mod memory;
pub mod name_store;
pub mod rocksdb;
pub mod sqlite;
pub mod traits;
