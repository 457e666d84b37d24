//! The cache store seam and its entry type.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

/// Logical partition of the store; keys only need to be unique per namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Classified intents keyed by message fingerprint
    Intent,
    /// Generated commentary and excerpts keyed by item id
    Detail,
    /// Catalog query results with an expiry
    Dynamic,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Intent => "intent",
            Namespace::Detail => "detail",
            Namespace::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored JSON value with optional expiry
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub value: Value,
    /// `None` means the entry never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(value: Value, created_at: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: None,
            created_at,
        }
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// An entry is stale from the instant `expires_at` is reached
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// Key/value storage shared by the intent, detail and dynamic caches.
///
/// Implementations do not interpret expiry on reads; callers decide what
/// to do with a stale entry. Writes overwrite (last write wins).
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<StoredEntry>>;

    async fn put(&self, namespace: Namespace, key: &str, entry: StoredEntry) -> Result<()>;

    /// Returns whether an entry was removed
    async fn delete(&self, namespace: Namespace, key: &str) -> Result<bool>;

    /// Remove every entry whose expiry is at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}
