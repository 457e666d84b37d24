//! SQLite-backed cache store.
//!
//! One table holds every namespace. Timestamps are stored as Unix
//! milliseconds so expiry sweeps are a single indexed comparison.

use crate::error::{CacheError, Result};
use crate::store::{CacheStore, Namespace, StoredEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistent store that survives restarts
#[derive(Clone)]
pub struct SqliteCacheStore {
    conn: Arc<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl SqliteCacheStore {
    /// Open or create the store at `path`, creating parent directories
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: Some(path.to_path_buf()),
        };
        store.init_schema()?;
        debug!("Opened cache store at {}", path.display());
        Ok(store)
    }

    /// A private in-memory database with the same schema
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                expires_at INTEGER,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (namespace, key)
            );
            CREATE INDEX IF NOT EXISTS idx_cache_entries_expires_at
                ON cache_entries(expires_at);
            "#,
        )?;
        Ok(())
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| CacheError::Poisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| CacheError::Task(e.to_string()))?
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(CacheError::Timestamp(millis))
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<StoredEntry>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT value, expires_at, created_at FROM cache_entries
                     WHERE namespace = ?1 AND key = ?2",
                    params![namespace.as_str(), key],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, Option<i64>>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()?;

            let Some((value, expires_at, created_at)) = row else {
                return Ok(None);
            };
            Ok(Some(StoredEntry {
                value: serde_json::from_str(&value)?,
                expires_at: expires_at.map(from_millis).transpose()?,
                created_at: from_millis(created_at)?,
            }))
        })
        .await
    }

    async fn put(&self, namespace: Namespace, key: &str, entry: StoredEntry) -> Result<()> {
        let key = key.to_string();
        let value = serde_json::to_string(&entry.value)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache_entries (namespace, key, value, expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    namespace.as_str(),
                    key,
                    value,
                    entry.expires_at.map(|t| t.timestamp_millis()),
                    entry.created_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM cache_entries WHERE namespace = ?1 AND key = ?2",
                params![namespace.as_str(), key],
            )?;
            Ok(removed > 0)
        })
        .await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now.timestamp_millis();
        self.with_conn(move |conn| {
            let removed = conn.execute(
                "DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                params![cutoff],
            )?;
            Ok(removed)
        })
        .await
    }
}
