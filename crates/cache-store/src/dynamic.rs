//! Expiring cache for expensive catalog queries.

use crate::clock::Clock;
use crate::store::{CacheStore, Namespace, StoredEntry};
use chrono::Duration;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Read-through cache with per-entry TTL on top of a [`CacheStore`].
///
/// Store failures are logged and treated as misses, so a broken store
/// degrades to always fetching live.
#[derive(Clone)]
pub struct DynamicCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl DynamicCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Return the cached value for `key`, or fetch, store and return it.
    ///
    /// ## Algorithm
    /// 1. Look up `key`; an entry at or past its expiry is deleted and
    ///    counts as a miss
    /// 2. On a miss, run `fetch`; its error is returned as-is and nothing
    ///    is stored
    /// 3. Store the fetched value with `expires_at = now + ttl_hours`
    #[instrument(skip(self, fetch))]
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, ttl_hours: u32, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            info!("Dynamic cache HIT: {}", key);
            return Ok(value);
        }

        info!("Dynamic cache MISS: {}", key);
        let value = fetch().await?;
        self.set(key, &value, ttl_hours).await;
        Ok(value)
    }

    /// Fresh cached value for `key`, if any
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = match self.store.get(Namespace::Dynamic, key).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Dynamic cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if entry.is_expired(self.clock.now()) {
            if let Err(e) = self.store.delete(Namespace::Dynamic, key).await {
                warn!("Failed to delete expired entry {}: {}", key, e);
            }
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl_hours`
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_hours: u32) {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize cache value for {}: {}", key, e);
                return;
            }
        };

        let now = self.clock.now();
        let entry = StoredEntry::new(json, now).expiring_at(now + Duration::hours(i64::from(ttl_hours)));
        match self.store.put(Namespace::Dynamic, key, entry).await {
            Ok(()) => info!("Dynamic cache SAVE: {} ({}h)", key, ttl_hours),
            Err(e) => warn!("Dynamic cache write failed for {}: {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{CacheError, Result as CacheResult};
    use crate::memory::MemoryCacheStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache_with_clock() -> (DynamicCache, Arc<ManualClock>, Arc<MemoryCacheStore>) {
        let store = Arc::new(MemoryCacheStore::new());
        let clock = Arc::new(ManualClock::default());
        let cache = DynamicCache::new(store.clone(), clock.clone());
        (cache, clock, store)
    }

    async fn fetch_counted(counter: &AtomicUsize) -> std::result::Result<Vec<u32>, String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let (cache, _clock, _store) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_fetch("trending", 6, || fetch_counted(&calls)).await;
        let second = cache.get_or_fetch("trending", 6, || fetch_counted(&calls)).await;

        assert_eq!(first.unwrap(), vec![1, 2, 3]);
        assert_eq!(second.unwrap(), vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let (cache, clock, _store) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch("trending", 6, || fetch_counted(&calls))
            .await
            .unwrap();
        clock.advance(Duration::hours(7));
        cache
            .get_or_fetch("trending", 6, || fetch_counted(&calls))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_a_miss() {
        let (cache, clock, store) = cache_with_clock();
        cache.set("upcoming", &vec![7u32], 6).await;

        clock.advance(Duration::hours(6) - Duration::seconds(1));
        assert_eq!(cache.get::<Vec<u32>>("upcoming").await, Some(vec![7]));

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get::<Vec<u32>>("upcoming").await, None);
        assert!(store.is_empty(), "Expired entry should be deleted on read");
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_cached() {
        let (cache, _clock, store) = cache_with_clock();
        let result: std::result::Result<Vec<u32>, String> = cache
            .get_or_fetch("trending", 6, || async { Err("catalog down".to_string()) })
            .await;

        assert_eq!(result, Err("catalog down".to_string()));
        assert!(store.is_empty());
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _: Namespace, _: &str) -> CacheResult<Option<StoredEntry>> {
            Err(CacheError::Poisoned)
        }
        async fn put(&self, _: Namespace, _: &str, _: StoredEntry) -> CacheResult<()> {
            Err(CacheError::Poisoned)
        }
        async fn delete(&self, _: Namespace, _: &str) -> CacheResult<bool> {
            Err(CacheError::Poisoned)
        }
        async fn purge_expired(&self, _: DateTime<Utc>) -> CacheResult<usize> {
            Err(CacheError::Poisoned)
        }
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_live_fetch() {
        let cache = DynamicCache::new(Arc::new(BrokenStore), Arc::new(ManualClock::default()));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache.get_or_fetch("trending", 6, || fetch_counted(&calls)).await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
