//! # Cache Store Crate
//!
//! Persistent key/value storage with TTL semantics, shared by the intent
//! cache, the detail enrichment cache and the dynamic catalog cache.
//!
//! ## Components
//!
//! - [`CacheStore`]: async storage seam partitioned by [`Namespace`]
//! - [`MemoryCacheStore`]: `DashMap`-backed store for tests and ephemeral runs
//! - [`SqliteCacheStore`]: SQLite-backed store that survives restarts
//! - [`DynamicCache`]: read-through cache with per-entry expiry
//! - [`Clock`]: time source, so expiry can be tested without waiting
//!
//! Reads and writes are not transactional. Concurrent read-then-write
//! sequences on the same key race with last-write-wins semantics.

pub mod clock;
pub mod dynamic;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dynamic::DynamicCache;
pub use error::{CacheError, Result};
pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;
pub use store::{CacheStore, Namespace, StoredEntry};
