//! SQLite-backed item store.
//!
//! Item lists are kept as JSON documents in a single `kv` table, one row
//! per namespace. Replacing a list is one `INSERT OR REPLACE`, so a write
//! either lands whole or not at all.
//!
//! The synchronous methods serve one-shot commands. Through [`ItemStore`]
//! every query runs on the blocking pool, off the async runtime thread.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection};

use super::{data_dir, ItemStore};
use crate::calendar::CalendarItem;
use crate::error::StoreError;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open the store at `<data_dir>/helm.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Self::open_path(&dir.join("helm.db"))
    }

    pub fn open_path(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get a raw value from the kv table.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        read_value(&lock(&self.conn), key)
    }

    /// Set a raw value in the kv table.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        write_value(&lock(&self.conn), key, value)
    }

    pub fn load_items(&self, key: &str) -> Result<Vec<CalendarItem>, StoreError> {
        decode_items(key, self.kv_get(key)?)
    }

    pub fn save_items(&self, key: &str, items: &[CalendarItem]) -> Result<(), StoreError> {
        self.kv_set(key, &encode_items(key, items)?)
    }
}

impl ItemStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Vec<CalendarItem>, StoreError> {
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let raw = read_value(&lock(&conn), &key)?;
            decode_items(&key, raw)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }

    async fn set(&self, key: &str, items: &[CalendarItem]) -> Result<(), StoreError> {
        let json = encode_items(key, items)?;
        let conn = Arc::clone(&self.conn);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || write_value(&lock(&conn), &key, &json))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(|e| e.into_inner())
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

fn decode_items(key: &str, raw: Option<String>) -> Result<Vec<CalendarItem>, StoreError> {
    match raw {
        Some(json) => serde_json::from_str(&json).map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

fn encode_items(key: &str, items: &[CalendarItem]) -> Result<String, StoreError> {
    serde_json::to_string(items).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}
