//! The catalog seam.
//!
//! Every component that reads the catalog takes an `Arc<dyn CatalogClient>`,
//! so tests and offline runs can substitute the in-memory catalog for the
//! live HTTP client.

use crate::error::Result;
use crate::types::{CatalogItem, DiscoverQuery, ItemId, MovieDetail};
use async_trait::async_trait;

/// Read-only access to the movie catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Items sorted by popularity (most popular first), optionally
    /// restricted to the query's genres.
    async fn discover(&self, query: &DiscoverQuery) -> Result<Vec<CatalogItem>>;

    /// Items whose title matches `title`, best match first.
    async fn search_title(&self, title: &str) -> Result<Vec<CatalogItem>>;

    /// Full record for one item; `Ok(None)` when the id is unknown.
    async fn detail(&self, id: ItemId) -> Result<Option<MovieDetail>>;

    /// Titles trending this week.
    async fn trending(&self) -> Result<Vec<CatalogItem>>;

    /// Titles about to be released in the configured region.
    async fn upcoming(&self) -> Result<Vec<CatalogItem>>;
}
