//! Error types for the catalog crate.

use thiserror::Error;

/// Errors that can occur while talking to the movie catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No API key was configured, so no request was attempted
    #[error("Catalog API key is not configured")]
    NotConfigured,

    /// Transport-level failure (connect, timeout, body decoding).
    /// The request URL inside has its API key redacted.
    #[error("Catalog request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The catalog answered with a non-success status
    #[error("Catalog returned status {status} for {path}")]
    Status { status: u16, path: String },

    /// A local catalog fixture could not be read or parsed
    #[error("Failed to load catalog fixture {path}: {reason}")]
    Fixture { path: String, reason: String },

    /// The catalog is reachable in principle but refused to serve
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(mut err: reqwest::Error) -> Self {
        if let Some(url) = err.url_mut() {
            redact_api_key(url);
        }
        CatalogError::Http(err)
    }
}

/// Query parameter carrying the catalog credential
pub(crate) const API_KEY_PARAM: &str = "api_key";

const REDACTED: &str = "REDACTED";

/// Replace the API key in a request URL so the URL is safe to log
pub(crate) fn redact_api_key(url: &mut reqwest::Url) {
    if !url.query_pairs().any(|(name, _)| name == API_KEY_PARAM) {
        return;
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == API_KEY_PARAM {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
