use std::path::Path;

use pns_storage::memory::MemoryStore;
use pns_storage::rocksdb::RocksDbStore;
use pns_storage::sqlite::SqliteStore;
use pns_storage::traits::DynStore;
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::NodeError;

/// Open the storage backend named by `config.db_type`.
///
/// A `memory` store starts empty and is dropped with the process.
pub fn create_store(config: &StorageConfig) -> Result<DynStore, NodeError> {
    let data_dir = Path::new(&config.data_dir);
    let store: DynStore = match config.db_type.as_str() {
        "memory" => Box::new(MemoryStore::new()),
        "sqlite" => Box::new(SqliteStore::open_in(data_dir)?),
        "rocksdb" => Box::new(RocksDbStore::open_in(data_dir)?),
        other => {
            return Err(NodeError::ConfigError {
                reason: format!(
                    "unknown storage backend '{}', expected 'memory', 'sqlite', or 'rocksdb'",
                    other
                ),
            })
        }
    };
    debug!(backend = %config.db_type, data_dir = %config.data_dir, "store opened");
    Ok(store)
}
