//! In-memory catalog.
//!
//! Holds a fixed set of items and details with a genre index for fast
//! filtered queries. Used for offline runs (loaded from a JSON fixture)
//! and as the catalog fake throughout the test suites.

use crate::client::CatalogClient;
use crate::error::{CatalogError, Result};
use crate::types::{CatalogItem, DiscoverQuery, ItemId, MovieDetail};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Number of items a discover query returns per page, matching the live catalog
pub const PAGE_SIZE: usize = 20;

/// On-disk fixture format
#[derive(Debug, Default, Deserialize)]
struct CatalogFixture {
    #[serde(default)]
    items: Vec<CatalogItem>,
    #[serde(default)]
    details: Vec<MovieDetail>,
    #[serde(default)]
    trending: Vec<ItemId>,
    #[serde(default)]
    upcoming: Vec<ItemId>,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    pub(crate) items: HashMap<ItemId, CatalogItem>,
    pub(crate) details: HashMap<ItemId, MovieDetail>,
    /// Items grouped by genre id (one item can appear in several lists)
    pub(crate) genre_index: HashMap<u32, Vec<ItemId>>,
    pub(crate) trending: Vec<ItemId>,
    pub(crate) upcoming: Vec<ItemId>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a JSON fixture file.
    ///
    /// The fixture holds `items`, `details`, and the id lists `trending`
    /// and `upcoming`; every section is optional.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let fixture_error = |reason: String| CatalogError::Fixture {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| fixture_error(e.to_string()))?;
        let fixture: CatalogFixture =
            serde_json::from_str(&raw).map_err(|e| fixture_error(e.to_string()))?;

        let mut catalog = Self::new();
        for item in fixture.items {
            catalog.insert_item(item);
        }
        for detail in fixture.details {
            catalog.insert_detail(detail);
        }
        catalog.trending = fixture.trending;
        catalog.upcoming = fixture.upcoming;

        tracing::info!(
            items = catalog.items.len(),
            details = catalog.details.len(),
            "Loaded catalog fixture from {}",
            path.display()
        );
        Ok(catalog)
    }

    /// Insert or replace an item and keep the genre index consistent
    pub fn insert_item(&mut self, item: CatalogItem) {
        if let Some(previous) = self.items.get(&item.id) {
            for genre_id in &previous.genre_ids {
                if let Some(ids) = self.genre_index.get_mut(genre_id) {
                    ids.retain(|&id| id != item.id);
                }
            }
        }
        for &genre_id in &item.genre_ids {
            self.genre_index.entry(genre_id).or_default().push(item.id);
        }
        self.items.insert(item.id, item);
    }

    pub fn insert_detail(&mut self, detail: MovieDetail) {
        self.details.insert(detail.id, detail);
    }

    pub fn set_trending(&mut self, ids: Vec<ItemId>) {
        self.trending = ids;
    }

    pub fn set_upcoming(&mut self, ids: Vec<ItemId>) {
        self.upcoming = ids;
    }

    pub fn get_item(&self, id: ItemId) -> Option<&CatalogItem> {
        self.items.get(&id)
    }

    /// All items tagged with a genre; empty slice for unknown genres
    pub fn get_items_by_genre(&self, genre_id: u32) -> &[ItemId] {
        self.genre_index
            .get(&genre_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// (items, details) counts
    pub fn counts(&self) -> (usize, usize) {
        (self.items.len(), self.details.len())
    }

    fn collect_ids(&self, ids: &[ItemId]) -> Vec<CatalogItem> {
        ids.iter()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn discover(&self, query: &DiscoverQuery) -> Result<Vec<CatalogItem>> {
        let mut matches: Vec<&CatalogItem> = match query.genre_ids.split_first() {
            None => self.items.values().collect(),
            Some((first, rest)) => self
                .get_items_by_genre(*first)
                .iter()
                .filter_map(|id| self.items.get(id))
                .filter(|item| rest.iter().all(|g| item.genre_ids.contains(g)))
                .collect(),
        };

        matches.sort_by_key(|item| (item.popularity_rank, item.id));

        let skip = (query.page.max(1) as usize - 1) * PAGE_SIZE;
        Ok(matches
            .into_iter()
            .skip(skip)
            .take(PAGE_SIZE)
            .cloned()
            .collect())
    }

    async fn search_title(&self, title: &str) -> Result<Vec<CatalogItem>> {
        let needle = title.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        // (0 = exact, 1 = substring) so exact matches sort first
        let mut matches: Vec<(u8, &CatalogItem)> = self
            .items
            .values()
            .filter_map(|item| {
                let candidate = item.title.to_lowercase();
                if candidate == needle {
                    Some((0, item))
                } else if candidate.contains(&needle) {
                    Some((1, item))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.rating.partial_cmp(&a.1.rating).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.1.id.cmp(&b.1.id))
        });

        Ok(matches.into_iter().map(|(_, item)| item.clone()).collect())
    }

    async fn detail(&self, id: ItemId) -> Result<Option<MovieDetail>> {
        Ok(self.details.get(&id).cloned())
    }

    async fn trending(&self) -> Result<Vec<CatalogItem>> {
        Ok(self.collect_ids(&self.trending))
    }

    async fn upcoming(&self) -> Result<Vec<CatalogItem>> {
        Ok(self.collect_ids(&self.upcoming))
    }
}
