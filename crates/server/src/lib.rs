//! # Server Crate
//!
//! HTTP surface of the chat service.
//!
//! ## Components
//!
//! - [`ChatOrchestrator`]: classify a message, then retrieve or look up items
//! - [`DetailEnricher`]: generated commentary and excerpts behind the detail cache
//! - [`DiscoveryService`]: trending and upcoming lists behind the dynamic cache
//! - [`AppState`]: everything above, built from an [`AppConfig`]
//! - [`build_router`] / [`run`]: axum router and listen loop
//!
//! ## Routes
//!
//! | Method | Path | |
//! |---|---|---|
//! | POST | `/chat` | one chat turn |
//! | GET | `/item/:id` | enriched detail view |
//! | GET | `/discovery/trending` | cached trending list |
//! | GET | `/discovery/upcoming` | cached upcoming list |
//! | POST | `/comments` | bearer-gated comment acknowledgement |
//! | GET | `/comments/:id` | bearer-gated, always empty |
//! | GET | `/health` | liveness |

pub mod config;
pub mod detail_view;
pub mod discovery;
pub mod enrichment;
pub mod orchestrator;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{AppConfig, CacheBackend, ConfigError};
pub use detail_view::DetailView;
pub use discovery::DiscoveryService;
pub use enrichment::{DetailEnricher, Enrichment};
pub use orchestrator::{ChatOrchestrator, ChatResponse, RecommendationCard};
pub use server::{build_router, run};
pub use state::{AppState, Services};

/// Default log filter: info everywhere, debug for this service's crates
pub const DEFAULT_LOG_FILTER: &str = "info,server=debug,intent=debug,retriever=debug";

/// Install the global tracing subscriber; `RUST_LOG` overrides `default_filter`
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
