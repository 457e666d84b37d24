//! Live catalog client for the TMDB REST API.

use crate::client::CatalogClient;
use crate::error::{API_KEY_PARAM, CatalogError, Result};
use crate::types::{
    CastMember, CatalogItem, DiscoverQuery, GenreTag, ItemId, MovieDetail, RegionProviders,
    Review,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Reviews are requested in English; the detail view translates them
const REVIEW_LANGUAGE: &str = "en-US";

/// Number of items kept from the trending and upcoming lists
pub const DISCOVERY_LIST_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Response language for titles and synopses (e.g. "ko-KR")
    pub language: String,
    /// Release region for the upcoming list (e.g. "KR")
    pub region: String,
    pub timeout: Duration,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            language: "ko-KR".to_string(),
            region: "KR".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// HTTP client for the live catalog.
#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(CatalogError::NotConfigured)
    }

    /// GET a catalog path and decode the JSON body.
    ///
    /// Returns `Ok(None)` for 404 so lookups of unknown ids are not errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        language: &str,
    ) -> Result<Option<T>> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(path, ?params, "Catalog request");

        let response = self
            .http
            .get(&url)
            .query(&[(API_KEY_PARAM, api_key), ("language", language)])
            .query(params)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<T>().await?)),
            status => Err(CatalogError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            }),
        }
    }

    async fn get_list(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<TmdbMovie>> {
        let page: Option<TmdbPage> = self.get_json(path, params, &self.config.language).await?;
        Ok(page.map(|p| p.results).unwrap_or_default())
    }

    async fn reviews(&self, id: ItemId) -> Result<Vec<Review>> {
        let path = format!("/movie/{}/reviews", id);
        let page: Option<TmdbReviewPage> = self.get_json(&path, &[], REVIEW_LANGUAGE).await?;
        Ok(page
            .map(|p| {
                p.results
                    .into_iter()
                    .map(|r| Review {
                        author: r.author,
                        content: r.content,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl CatalogClient for TmdbClient {
    #[instrument(skip(self))]
    async fn discover(&self, query: &DiscoverQuery) -> Result<Vec<CatalogItem>> {
        let mut params = vec![
            ("sort_by", "popularity.desc".to_string()),
            ("page", query.page.max(1).to_string()),
        ];
        if !query.genre_ids.is_empty() {
            let genres: Vec<String> = query.genre_ids.iter().map(u32::to_string).collect();
            params.push(("with_genres", genres.join(",")));
        }
        let movies = self.get_list("/discover/movie", &params).await?;
        Ok(into_items(movies, query.page))
    }

    #[instrument(skip(self))]
    async fn search_title(&self, title: &str) -> Result<Vec<CatalogItem>> {
        let params = [("query", title.to_string()), ("page", "1".to_string())];
        let movies = self.get_list("/search/movie", &params).await?;
        Ok(into_items(movies, 1))
    }

    #[instrument(skip(self))]
    async fn detail(&self, id: ItemId) -> Result<Option<MovieDetail>> {
        let path = format!("/movie/{}", id);
        let params = [("append_to_response", "credits,watch/providers".to_string())];

        let (detail, reviews) = tokio::join!(
            self.get_json::<TmdbDetail>(&path, &params, &self.config.language),
            self.reviews(id),
        );

        let Some(detail) = detail? else {
            return Ok(None);
        };
        // Missing reviews never block the detail view
        let reviews = reviews.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch reviews for item {}: {}", id, e);
            Vec::new()
        });

        Ok(Some(detail.into_detail(reviews)))
    }

    async fn trending(&self) -> Result<Vec<CatalogItem>> {
        let movies = self.get_list("/trending/movie/week", &[]).await?;
        let mut items = into_items(movies, 1);
        items.truncate(DISCOVERY_LIST_LEN);
        Ok(items)
    }

    async fn upcoming(&self) -> Result<Vec<CatalogItem>> {
        let params = [("region", self.config.region.clone())];
        let movies = self.get_list("/movie/upcoming", &params).await?;
        let mut items = into_items(movies, 1);
        items.truncate(DISCOVERY_LIST_LEN);
        Ok(items)
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TmdbPage {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: ItemId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_average: f32,
    #[serde(default)]
    genre_ids: Vec<u32>,
}

/// Convert one result page, numbering popularity ranks across pages
fn into_items(movies: Vec<TmdbMovie>, page: u32) -> Vec<CatalogItem> {
    let offset = (page.max(1) - 1) * crate::memory::PAGE_SIZE as u32;
    movies
        .into_iter()
        .enumerate()
        .map(|(index, movie)| CatalogItem {
            id: movie.id,
            title: movie.title,
            popularity_rank: offset + index as u32 + 1,
            rating: movie.vote_average,
            poster_ref: movie.poster_path,
            genre_ids: movie.genre_ids,
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            overview: movie.overview,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct TmdbDetail {
    id: ItemId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_average: f32,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    genres: Vec<GenreTag>,
    #[serde(default)]
    credits: Option<TmdbCredits>,
    #[serde(rename = "watch/providers", default)]
    watch_providers: Option<TmdbProviderResults>,
}

impl TmdbDetail {
    fn into_detail(self, reviews: Vec<Review>) -> MovieDetail {
        MovieDetail {
            id: self.id,
            title: self.title,
            overview: self.overview,
            poster_ref: self.poster_path,
            release_date: self.release_date.filter(|d| !d.is_empty()),
            rating: self.vote_average,
            runtime_minutes: self.runtime.filter(|&m| m > 0),
            genres: self.genres,
            cast: self
                .credits
                .map(|c| {
                    c.cast
                        .into_iter()
                        .map(|member| CastMember {
                            name: member.name,
                            character: member.character,
                            profile_ref: member.profile_path,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            watch_providers: self.watch_providers.map(|w| w.results).unwrap_or_default(),
            reviews,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    cast: Vec<TmdbCast>,
}

#[derive(Debug, Deserialize)]
struct TmdbCast {
    name: String,
    #[serde(default)]
    character: String,
    profile_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbProviderResults {
    #[serde(default)]
    results: HashMap<String, RegionProviders>,
}

#[derive(Debug, Deserialize)]
struct TmdbReviewPage {
    #[serde(default)]
    results: Vec<TmdbReview>,
}

#[derive(Debug, Deserialize)]
struct TmdbReview {
    #[serde(default)]
    author: String,
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = TmdbClient::new(TmdbConfig::default()).unwrap();
        let result = client.discover(&DiscoverQuery::default()).await;
        assert!(matches!(result, Err(CatalogError::NotConfigured)));
    }

    #[test]
    fn test_ranks_continue_across_pages() {
        let movies = vec![
            TmdbMovie {
                id: 1,
                title: "A".into(),
                overview: String::new(),
                poster_path: None,
                release_date: Some(String::new()),
                vote_average: 7.0,
                genre_ids: vec![],
            },
            TmdbMovie {
                id: 2,
                title: "B".into(),
                overview: String::new(),
                poster_path: None,
                release_date: Some("2020-01-01".into()),
                vote_average: 6.0,
                genre_ids: vec![],
            },
        ];
        let items = into_items(movies, 2);
        assert_eq!(items[0].popularity_rank, 21);
        assert_eq!(items[1].popularity_rank, 22);
        assert_eq!(items[0].release_date, None);
    }
}
