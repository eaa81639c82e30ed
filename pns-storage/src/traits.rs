use std::sync::Arc;

use crate::error::StorageError;

/// Result type for prefix scan operations: a list of key-value byte pairs.
pub type KvPairs = Vec<(Vec<u8>, Vec<u8>)>;

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Byte-oriented key-value store shared by every backend.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;
    fn exists(&self, key: &[u8]) -> Result<bool, StorageError>;
    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StorageError>;
}

/// Atomic batch writer trait.
///
/// Every name service operation is committed through a single
/// `write_batch` call: either all of its writes land or none do.
pub trait BatchWriter: KvStore {
    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError>;

    /// Open a read-validate-write span. Until the next `write_batch` or
    /// `end_exclusive`, writers in other processes sharing the same files
    /// are held off and reads observe their committed state.
    ///
    /// Single-process backends have nothing to do here.
    fn begin_exclusive(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Close a span that ended without a `write_batch`. No-op otherwise.
    fn end_exclusive(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Type-erased store selected at runtime from configuration.
pub type DynStore = Box<dyn BatchWriter>;

/// Forward both traits through a smart pointer or reference to the store
/// it wraps.
macro_rules! forward_store {
    ($($wrapper:ty),+ $(,)?) => {$(
        impl<S: KvStore + ?Sized> KvStore for $wrapper {
            fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
                (**self).get(key)
            }

            fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
                (**self).put(key, value)
            }

            fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
                (**self).delete(key)
            }

            fn exists(&self, key: &[u8]) -> Result<bool, StorageError> {
                (**self).exists(key)
            }

            fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StorageError> {
                (**self).prefix_scan(prefix)
            }
        }
    )+};
}

forward_store!(&S, Arc<S>, Box<S>);

macro_rules! forward_batch {
    ($($wrapper:ty),+ $(,)?) => {$(
        impl<S: BatchWriter + ?Sized> BatchWriter for $wrapper {
            fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError> {
                (**self).write_batch(ops)
            }

            fn begin_exclusive(&self) -> Result<(), StorageError> {
                (**self).begin_exclusive()
            }

            fn end_exclusive(&self) -> Result<(), StorageError> {
                (**self).end_exclusive()
            }
        }
    )+};
}

forward_batch!(Arc<S>, Box<S>);
