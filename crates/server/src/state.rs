//! Shared application state and its construction from [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use cache_store::{CacheStore, Clock, DynamicCache, MemoryCacheStore, SqliteCacheStore, SystemClock};
use catalog::{CatalogClient, InMemoryCatalog, TmdbClient, TmdbConfig};
use genai_client::{GeminiClient, GeminiConfig, TextGenerator};
use intent::{IntentCache, IntentClassifier};
use retriever::RecommendationRetriever;

use crate::config::{AppConfig, CacheBackend};
use crate::discovery::DiscoveryService;
use crate::enrichment::DetailEnricher;
use crate::orchestrator::ChatOrchestrator;

/// The external services one process talks to
pub struct Services {
    pub catalog: Arc<dyn CatalogClient>,
    /// Generator for intent classification
    pub classifier_model: Arc<dyn TextGenerator>,
    /// Generator for commentary and excerpt translation
    pub enrichment_model: Arc<dyn TextGenerator>,
    pub store: Arc<dyn CacheStore>,
    pub clock: Arc<dyn Clock>,
}

pub struct AppState {
    pub orchestrator: ChatOrchestrator,
    pub enricher: DetailEnricher,
    pub discovery: DiscoveryService,
    pub intent_cache: IntentCache,
    pub store: Arc<dyn CacheStore>,
    pub clock: Arc<dyn Clock>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Build the live services described by `config` and wire them up
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let services = Services::from_config(config)?;
        Ok(Self::assemble(services, config))
    }

    /// Wire already-built services together
    pub fn assemble(services: Services, config: &AppConfig) -> Self {
        let Services {
            catalog,
            classifier_model,
            enrichment_model,
            store,
            clock,
        } = services;

        let intent_cache = IntentCache::new(store.clone(), clock.clone());
        let classifier = IntentClassifier::standard(
            classifier_model,
            intent_cache.clone(),
            config.generative.temperature,
        );
        let retriever = RecommendationRetriever::new(catalog.clone()).with_pool_size(config.recommend.pool_size);
        let orchestrator = ChatOrchestrator::new(Arc::new(classifier), Arc::new(retriever))
            .with_limit(config.recommend.limit);

        let enricher = DetailEnricher::new(catalog.clone(), enrichment_model, store.clone(), clock.clone());
        let discovery = DiscoveryService::new(
            catalog,
            DynamicCache::new(store.clone(), clock.clone()),
            config.recommend.discovery_ttl_hours,
            config.recommend.discovery_list_len,
        );

        Self {
            orchestrator,
            enricher,
            discovery,
            intent_cache,
            store,
            clock,
            request_timeout: config.request_timeout(),
        }
    }
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            catalog: build_catalog(config)?,
            classifier_model: build_generator(config, &config.generative.classifier_model)?,
            enrichment_model: build_generator(config, &config.generative.enrichment_model)?,
            store: build_store(config)?,
            clock: Arc::new(SystemClock),
        })
    }
}

fn build_catalog(config: &AppConfig) -> Result<Arc<dyn CatalogClient>> {
    if let Some(path) = &config.catalog.fixture_path {
        let catalog = InMemoryCatalog::load_from_file(path).context("Failed to load catalog fixture")?;
        return Ok(Arc::new(catalog));
    }

    if config.catalog.api_key.is_none() {
        warn!("No catalog API key configured; catalog lookups will return nothing");
    }
    let client = TmdbClient::new(TmdbConfig {
        base_url: config.catalog.base_url.clone(),
        api_key: config.catalog.api_key.clone(),
        language: config.catalog.language.clone(),
        region: config.catalog.region.clone(),
        timeout: config.external_timeout(),
    })
    .context("Failed to build catalog client")?;
    Ok(Arc::new(client))
}

fn build_generator(config: &AppConfig, model: &str) -> Result<Arc<dyn TextGenerator>> {
    let client = GeminiClient::new(GeminiConfig {
        base_url: config.generative.base_url.clone(),
        api_key: config.generative.api_key.clone(),
        model: model.to_string(),
        timeout: config.external_timeout(),
    })
    .context("Failed to build generative client")?;

    if !client.is_configured() {
        warn!("No generative API key configured; {} calls will use fallbacks", model);
    }
    Ok(Arc::new(client))
}

fn build_store(config: &AppConfig) -> Result<Arc<dyn CacheStore>> {
    match config.cache.backend {
        CacheBackend::Memory => {
            info!("Using in-memory cache store");
            Ok(Arc::new(MemoryCacheStore::new()))
        }
        CacheBackend::Sqlite => {
            let store = SqliteCacheStore::open(&config.cache.path)
                .with_context(|| format!("Failed to open cache store {}", config.cache.path.display()))?;
            info!("Using SQLite cache store at {}", config.cache.path.display());
            Ok(Arc::new(store))
        }
    }
}
