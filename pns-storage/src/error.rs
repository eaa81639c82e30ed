use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("read error: {reason}")]
    ReadError { reason: String },

    #[error("write error: {reason}")]
    WriteError { reason: String },

    #[error("batch error: {reason}")]
    BatchError { reason: String },

    #[error("sqlite error: {reason}")]
    SqliteError { reason: String },

    #[error("rocksdb error: {reason}")]
    RocksDbError { reason: String },

    #[error("serialization error: {reason}")]
    SerializationError { reason: String },

    #[error("deserialization error for key {key}: {reason}")]
    DeserializationError { key: String, reason: String },

    #[error("malformed key under table '{table}': {key}")]
    MalformedKey { table: &'static str, key: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::SqliteError {
            reason: err.to_string(),
        }
    }
}

impl From<rocksdb::Error> for StorageError {
    fn from(err: rocksdb::Error) -> Self {
        StorageError::RocksDbError {
            reason: err.into_string(),
        }
    }
}
