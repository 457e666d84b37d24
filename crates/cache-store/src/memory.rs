//! Process-local cache store.

use crate::error::Result;
use crate::store::{CacheStore, Namespace, StoredEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Concurrent in-memory store; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<(Namespace, String), StoredEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<StoredEntry>> {
        Ok(self
            .entries
            .get(&(namespace, key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn put(&self, namespace: Namespace, key: &str, entry: StoredEntry) -> Result<()> {
        self.entries.insert((namespace, key.to_string()), entry);
        Ok(())
    }

    async fn delete(&self, namespace: Namespace, key: &str) -> Result<bool> {
        Ok(self.entries.remove(&(namespace, key.to_string())).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()))
    }
}
