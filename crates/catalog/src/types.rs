//! Core domain types for the movie catalog.
//!
//! The catalog is owned by an external service; the types here are the
//! read-only views the rest of the system works with.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a catalog item (a TMDB movie id)
pub type ItemId = u32;

/// Base URL for catalog artwork
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Build a full artwork URL from a catalog image reference
pub fn image_url(size: &str, image_ref: &str) -> String {
    format!("{}/{}{}", IMAGE_BASE_URL, size, image_ref)
}

// =============================================================================
// Catalog Items
// =============================================================================

/// One title as returned by list-style catalog queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    /// 1-based position in the catalog's popularity ordering
    pub popularity_rank: u32,
    /// Average audience rating on a 0-10 scale
    pub rating: f32,
    /// Poster image reference (a path, not a full URL)
    pub poster_ref: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: String,
}

/// Parameters for a popularity-sorted catalog query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    /// Every listed genre must be present on a returned item
    pub genre_ids: Vec<u32>,
    pub page: u32,
}

impl DiscoverQuery {
    pub fn new(genre_ids: Vec<u32>) -> Self {
        Self { genre_ids, page: 1 }
    }
}

impl Default for DiscoverQuery {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// =============================================================================
// Item Detail
// =============================================================================

/// Full record for a single title, used by the detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_ref: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    pub rating: f32,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub genres: Vec<GenreTag>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    /// Streaming availability keyed by region code ("KR", "US", ...)
    #[serde(default)]
    pub watch_providers: HashMap<String, RegionProviders>,
    /// Raw critical excerpts, in the catalog's original language
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl MovieDetail {
    /// Release year, taken from the `YYYY-MM-DD` release date
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .filter(|year| !year.is_empty())
    }

    pub fn genre_ids(&self) -> Vec<u32> {
        self.genres.iter().map(|g| g.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreTag {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub content: String,
}

/// Providers for one region, split by offer type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionProviders {
    #[serde(default)]
    pub flatrate: Vec<Provider>,
    #[serde(default)]
    pub buy: Vec<Provider>,
    #[serde(default)]
    pub rent: Vec<Provider>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: u32,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// A streaming platform as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub name: String,
    pub logo_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_with_date(date: Option<&str>) -> MovieDetail {
        MovieDetail {
            id: 1,
            title: "Test".to_string(),
            overview: String::new(),
            poster_ref: None,
            release_date: date.map(str::to_string),
            rating: 7.0,
            runtime_minutes: None,
            genres: vec![],
            cast: vec![],
            watch_providers: HashMap::new(),
            reviews: vec![],
        }
    }

    #[test]
    fn test_year_from_release_date() {
        assert_eq!(detail_with_date(Some("1999-10-15")).year(), Some("1999"));
        assert_eq!(detail_with_date(Some("")).year(), None);
        assert_eq!(detail_with_date(None).year(), None);
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("w500", "/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn test_catalog_item_wire_names() {
        let item = CatalogItem {
            id: 550,
            title: "Fight Club".to_string(),
            popularity_rank: 1,
            rating: 8.4,
            poster_ref: Some("/p.jpg".to_string()),
            genre_ids: vec![18],
            release_date: None,
            overview: String::new(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["popularityRank"], 1);
        assert_eq!(json["posterRef"], "/p.jpg");
    }
}
