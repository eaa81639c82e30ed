use std::path::Path;

use rocksdb::{
    ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options, WriteBatchWithTransaction,
};

use crate::error::StorageError;
use crate::keys::Table;
use crate::traits::{BatchOp, BatchWriter, KvPairs, KvStore};

/// Column family for keys outside the name service tables.
pub const DEFAULT_CF: &str = "default";

/// RocksDB-backed key-value store.
///
/// Each [`Table`] lives in its own column family; keys are routed by their
/// table prefix and stored unchanged, so prefix scans stay within one family.
pub struct RocksDbStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksDbStore {
    /// Open (or create) a RocksDB store at the given path with one column
    /// family per table.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = std::iter::once(DEFAULT_CF)
            .chain(Table::ALL.iter().map(|t| t.name()))
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db =
            DBWithThreadMode::<MultiThreaded>::open_cf_descriptors(&opts, path, cf_descriptors)?;
        Ok(Self { db })
    }

    /// Open a store at `<dir>/rocksdb`.
    pub fn open_in(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(|e| StorageError::WriteError {
            reason: format!("cannot create {}: {}", dir.display(), e),
        })?;
        Self::new(&dir.join("rocksdb").to_string_lossy())
    }

    fn cf_name(key: &[u8]) -> &'static str {
        Table::of_key(key).map(Table::name).unwrap_or(DEFAULT_CF)
    }

    fn cf(
        &self,
        name: &str,
    ) -> Result<std::sync::Arc<rocksdb::BoundColumnFamily<'_>>, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::RocksDbError {
                reason: format!("column family '{}' not found", name),
            })
    }

    /// Number of keys in one table.
    pub fn count(&self, table: Table) -> Result<usize, StorageError> {
        Ok(self.prefix_scan(table.prefix())?.len())
    }
}

impl KvStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let cf = self.cf(Self::cf_name(key))?;
        Ok(self.db.get_cf(&cf, key)?)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let cf = self.cf(Self::cf_name(key))?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        let cf = self.cf(Self::cf_name(key))?;
        self.db.delete_cf(&cf, key)?;
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StorageError> {
        let cf = self.cf(Self::cf_name(prefix))?;
        let mut results = Vec::new();
        for item in self.db.prefix_iterator_cf(&cf, prefix) {
            let (key, value) = item.map_err(|e| StorageError::ReadError {
                reason: e.to_string(),
            })?;
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }
}

impl BatchWriter for RocksDbStore {
    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError> {
        let mut batch = WriteBatchWithTransaction::<false>::default();
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    let cf = self.cf(Self::cf_name(&key))?;
                    batch.put_cf(&cf, &key, &value);
                }
                BatchOp::Delete { key } => {
                    let cf = self.cf(Self::cf_name(&key))?;
                    batch.delete_cf(&cf, &key);
                }
            }
        }
        self.db.write(batch)?;
        Ok(())
    }
}
