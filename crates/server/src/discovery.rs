//! Trending and upcoming lists, served through the dynamic cache.

use std::sync::Arc;

use tracing::warn;

use cache_store::DynamicCache;
use catalog::{CatalogClient, CatalogItem};

pub const TRENDING_KEY: &str = "tmdb:trending";
pub const UPCOMING_KEY: &str = "tmdb:upcoming";

#[derive(Clone)]
pub struct DiscoveryService {
    catalog: Arc<dyn CatalogClient>,
    cache: DynamicCache,
    ttl_hours: u32,
    list_len: usize,
}

impl DiscoveryService {
    pub fn new(catalog: Arc<dyn CatalogClient>, cache: DynamicCache, ttl_hours: u32, list_len: usize) -> Self {
        Self {
            catalog,
            cache,
            ttl_hours,
            list_len,
        }
    }

    /// Titles trending this week; empty when the catalog is unreachable
    pub async fn trending(&self) -> Vec<CatalogItem> {
        self.cached_list(TRENDING_KEY, || self.catalog.trending()).await
    }

    /// Titles about to open; empty when the catalog is unreachable
    pub async fn upcoming(&self) -> Vec<CatalogItem> {
        self.cached_list(UPCOMING_KEY, || self.catalog.upcoming()).await
    }

    async fn cached_list<F, Fut>(&self, key: &str, fetch: F) -> Vec<CatalogItem>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = catalog::Result<Vec<CatalogItem>>>,
    {
        let list_len = self.list_len;
        let result = self
            .cache
            .get_or_fetch(key, self.ttl_hours, || async move {
                let mut items = fetch().await?;
                items.truncate(list_len);
                Ok::<_, catalog::CatalogError>(items)
            })
            .await;

        result.unwrap_or_else(|e| {
            warn!("Failed to load {}: {}", key, e);
            Vec::new()
        })
    }
}
