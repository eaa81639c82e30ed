use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::traits::{BatchOp, BatchWriter, KvPairs, KvStore};

const UPSERT: &str = "INSERT OR REPLACE INTO pns_kv (key, value) VALUES (?1, ?2)";
const DELETE: &str = "DELETE FROM pns_kv WHERE key = ?1";

/// How long `begin_exclusive` waits for another process's write span.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

struct Inner {
    conn: Connection,
    /// A `BEGIN IMMEDIATE` transaction opened by `begin_exclusive` is live.
    exclusive: bool,
}

/// SQLite-backed key-value store.
/// All tables share a single `pns_kv` relation keyed by the prefixed key.
///
/// Several processes may open the same file. An exclusive span takes
/// SQLite's write lock up front, so a second span waits until the first
/// commits or rolls back and then reads the committed state.
pub struct SqliteStore {
    inner: Mutex<Inner>,
}

impl SqliteStore {
    /// Open (or create) a SQLite store at the given path.
    /// Use `:memory:` for an in-memory database.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS pns_kv (key BLOB PRIMARY KEY, value BLOB NOT NULL)",
            [],
        )?;
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                exclusive: false,
            }),
        })
    }

    /// Open a store at `<dir>/pns.sqlite`, creating `dir` if needed.
    pub fn open_in(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(|e| StorageError::WriteError {
            reason: format!("cannot create {}: {}", dir.display(), e),
        })?;
        let path = dir.join("pns.sqlite");
        Self::new(&path.to_string_lossy())
    }

    fn lock_for_read(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner.lock().map_err(|e| StorageError::ReadError {
            reason: e.to_string(),
        })
    }

    fn lock_for_write(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner.lock().map_err(|e| StorageError::WriteError {
            reason: e.to_string(),
        })
    }
}

fn apply(conn: &Connection, ops: Vec<BatchOp>) -> Result<(), StorageError> {
    for op in ops {
        match op {
            BatchOp::Put { key, value } => {
                conn.execute(UPSERT, params![key, value])?;
            }
            BatchOp::Delete { key } => {
                conn.execute(DELETE, params![key])?;
            }
        }
    }
    Ok(())
}

impl KvStore for SqliteStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let inner = self.lock_for_read()?;
        let mut stmt = inner
            .conn
            .prepare_cached("SELECT value FROM pns_kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let inner = self.lock_for_write()?;
        inner.conn.execute(UPSERT, params![key, value])?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        let inner = self.lock_for_write()?;
        inner.conn.execute(DELETE, params![key])?;
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, StorageError> {
        let inner = self.lock_for_read()?;
        let mut stmt = inner
            .conn
            .prepare_cached("SELECT 1 FROM pns_kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        Ok(rows.next()?.is_some())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StorageError> {
        let inner = self.lock_for_read()?;
        let conn = &inner.conn;
        let mut results = Vec::new();
        match upper_bound(prefix) {
            Some(ub) => {
                let mut stmt = conn.prepare_cached(
                    "SELECT key, value FROM pns_kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
                )?;
                let mut rows = stmt.query(params![prefix, ub])?;
                while let Some(row) = rows.next()? {
                    results.push((row.get(0)?, row.get(1)?));
                }
            }
            None => {
                let mut stmt = conn
                    .prepare_cached("SELECT key, value FROM pns_kv WHERE key >= ?1 ORDER BY key")?;
                let mut rows = stmt.query(params![prefix])?;
                while let Some(row) = rows.next()? {
                    let k: Vec<u8> = row.get(0)?;
                    if !k.starts_with(prefix) {
                        break;
                    }
                    results.push((k, row.get(1)?));
                }
            }
        }
        Ok(results)
    }
}

impl BatchWriter for SqliteStore {
    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().map_err(|e| StorageError::BatchError {
            reason: e.to_string(),
        })?;
        if inner.exclusive {
            inner.exclusive = false;
            let result = apply(&inner.conn, ops)
                .and_then(|()| inner.conn.execute_batch("COMMIT").map_err(StorageError::from));
            if result.is_err() {
                // The span is over either way; a failed rollback leaves nothing to undo.
                let _ = inner.conn.execute_batch("ROLLBACK");
            }
            return result;
        }
        // Dropping `tx` without commit rolls the whole batch back.
        let tx = inner.conn.unchecked_transaction()?;
        apply(&tx, ops)?;
        tx.commit()?;
        Ok(())
    }

    fn begin_exclusive(&self) -> Result<(), StorageError> {
        let mut inner = self.lock_for_write()?;
        if inner.exclusive {
            return Err(StorageError::BatchError {
                reason: "exclusive span already open".to_string(),
            });
        }
        inner.conn.execute_batch("BEGIN IMMEDIATE")?;
        inner.exclusive = true;
        Ok(())
    }

    fn end_exclusive(&self) -> Result<(), StorageError> {
        let mut inner = self.lock_for_write()?;
        if inner.exclusive {
            inner.exclusive = false;
            inner.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}

/// Smallest key greater than every key starting with `prefix`.
/// None if the prefix is all 0xFF bytes.
fn upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut bound = prefix.to_vec();
    while let Some(last) = bound.pop() {
        if last < 0xFF {
            bound.push(last + 1);
            return Some(bound);
        }
    }
    None
}
