//! # Retriever Crate
//!
//! Turns classifier keywords into a short, non-repeating list of catalog
//! items.
//!
//! ## Algorithm
//! 1. Map each keyword to a catalog genre id (unknown keywords are dropped)
//! 2. Query the catalog by popularity, filtered by the resolved genres
//! 3. Remove every excluded ("already seen") item
//! 4. Sort by rating, highest first
//! 5. Keep the top `pool_size` items as the candidate pool
//! 6. Shuffle the pool (Fisher-Yates) and return the first `limit`
//!
//! Shuffling a bounded high-quality pool keeps results relevant while
//! letting repeated requests for the same keywords come back different.
//!
//! ## Example Usage
//!
//! ```ignore
//! let retriever = RecommendationRetriever::new(catalog.clone());
//! let items = retriever
//!     .retrieve(&["drama".to_string()], &excluded_ids, 3)
//!     .await;
//! ```

pub mod pool;

pub use pool::{rank_candidates, select_from_pool};

use catalog::{CatalogClient, CatalogItem, DiscoverQuery, ItemId, resolve_genre_ids};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default candidate pool size; always at least the requested limit
pub const DEFAULT_POOL_SIZE: usize = 10;

pub struct RecommendationRetriever {
    catalog: Arc<dyn CatalogClient>,
    pool_size: usize,
}

impl RecommendationRetriever {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            catalog,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Configure the candidate pool size (default: 10)
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Retrieve up to `limit` items for `keywords`, never returning an
    /// item from `excluded`.
    ///
    /// A catalog failure yields an empty list.
    #[instrument(skip(self, excluded), fields(excluded = excluded.len()))]
    pub async fn retrieve(
        &self,
        keywords: &[String],
        excluded: &HashSet<ItemId>,
        limit: usize,
    ) -> Vec<CatalogItem> {
        if limit == 0 {
            return Vec::new();
        }

        let genre_ids = resolve_genre_ids(keywords);
        debug!("Resolved keywords {:?} to genres {:?}", keywords, genre_ids);

        let mut query = DiscoverQuery::new(genre_ids);
        let mut ranked = match self.catalog.discover(&query).await {
            Ok(items) => rank_candidates(items, excluded),
            Err(e) => {
                warn!("Catalog discover failed: {}", e);
                return Vec::new();
            }
        };

        // Heavily excluded first pages get one more page to draw from
        if ranked.len() < limit {
            query.page += 1;
            match self.catalog.discover(&query).await {
                Ok(items) => {
                    let seen: HashSet<ItemId> = ranked.iter().map(|item| item.id).collect();
                    let extra = items.into_iter().filter(|item| !seen.contains(&item.id));
                    ranked = rank_candidates(ranked.into_iter().chain(extra).collect(), excluded);
                }
                Err(e) => debug!("Skipping second page: {}", e),
            }
        }

        let pool_size = self.pool_size.max(limit);
        let selected = select_from_pool(ranked, pool_size, limit, &mut rand::rng());
        info!("Retrieved {} recommendations", selected.len());
        selected
    }

    /// Look up a named title: best catalog match, no exclusion, no shuffle
    #[instrument(skip(self))]
    pub async fn find_title(&self, title: &str) -> Option<CatalogItem> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        match self.catalog.search_title(title).await {
            Ok(items) => items.into_iter().next(),
            Err(e) => {
                warn!("Catalog title search failed for '{}': {}", title, e);
                None
            }
        }
    }
}
