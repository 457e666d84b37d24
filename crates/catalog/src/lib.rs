//! # Catalog Crate
//!
//! Read-only access to the external movie catalog.
//!
//! ## Components
//!
//! - [`CatalogClient`]: the async seam every other crate reads through
//! - [`TmdbClient`]: live client for the TMDB REST API
//! - [`InMemoryCatalog`]: fixture-backed catalog for offline runs and tests
//! - [`Genre`]: the genre dictionary mapping keywords (English, Korean,
//!   aliases) to catalog genre ids and back to display names
//! - [`available_platforms`]: streaming platform extraction for the detail view
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogClient, DiscoverQuery, TmdbClient, TmdbConfig, resolve_genre_ids};
//!
//! let client = TmdbClient::new(TmdbConfig {
//!     api_key: Some(api_key),
//!     ..Default::default()
//! })?;
//! let genre_ids = resolve_genre_ids(&["drama", "sci-fi"]);
//! let items = client.discover(&DiscoverQuery::new(genre_ids)).await?;
//! ```

pub mod client;
pub mod error;
pub mod genres;
pub mod memory;
pub mod providers;
pub mod tmdb;
pub mod types;

pub use client::CatalogClient;
pub use error::{CatalogError, Result};
pub use genres::{Genre, display_names, resolve_genre_ids};
pub use memory::InMemoryCatalog;
pub use providers::available_platforms;
pub use tmdb::{TmdbClient, TmdbConfig};
pub use types::*;
