//! Application configuration.
//!
//! Layered as: built-in defaults, then an optional TOML file, then
//! environment overrides. Missing API keys are allowed; the affected
//! client reports `NotConfigured` and the fallback paths take over.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const ENV_CONFIG_PATH: &str = "REEL_CHAT_CONFIG";
pub const ENV_TMDB_API_KEY: &str = "TMDB_API_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_BIND: &str = "REEL_CHAT_BIND";
pub const ENV_CACHE_PATH: &str = "REEL_CHAT_CACHE_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub generative: GenerativeSettings,
    pub cache: CacheSettings,
    pub recommend: RecommendSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Upper bound for one chat request, end to end
    pub request_timeout_secs: u64,
    /// Upper bound for any single catalog or generative call
    pub external_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
            external_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub language: String,
    pub region: String,
    /// Serve the catalog from a JSON fixture instead of the live API
    pub fixture_path: Option<PathBuf>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: catalog::tmdb::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            language: "ko-KR".to_string(),
            region: "KR".to_string(),
            fixture_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model for intent classification
    pub classifier_model: String,
    /// Model for commentary and excerpt translation
    pub enrichment_model: String,
    pub temperature: f32,
}

impl Default for GenerativeSettings {
    fn default() -> Self {
        Self {
            base_url: genai_client::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            classifier_model: "gemini-2.0-flash".to_string(),
            enrichment_model: "gemini-2.0-flash-lite".to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub path: PathBuf,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Sqlite,
            path: PathBuf::from("data/reel-chat.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendSettings {
    /// Candidate pool the final picks are shuffled from
    pub pool_size: usize,
    /// Recommendations per chat answer
    pub limit: usize,
    pub discovery_ttl_hours: u32,
    pub discovery_list_len: usize,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            pool_size: retriever::DEFAULT_POOL_SIZE,
            limit: 3,
            discovery_ttl_hours: 6,
            discovery_list_len: catalog::tmdb::DISCOVERY_LIST_LEN,
        }
    }
}

impl AppConfig {
    /// Load from `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load from `path` (if given) with environment values from `lookup`
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(ENV_TMDB_API_KEY) {
            self.catalog.api_key = Some(key);
        }
        if let Some(key) = non_empty(ENV_GEMINI_API_KEY) {
            self.generative.api_key = Some(key);
        }
        if let Some(bind) = non_empty(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(path) = non_empty(ENV_CACHE_PATH) {
            self.cache.path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.recommend.limit == 0 {
            return Err(ConfigError::Invalid("recommend.limit must be at least 1".into()));
        }
        if self.server.request_timeout_secs == 0 || self.server.external_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least 1 second".into()));
        }
        if !(0.0..=2.0).contains(&self.generative.temperature) {
            return Err(ConfigError::Invalid(format!(
                "generative.temperature {} is outside 0.0..=2.0",
                self.generative.temperature
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("bind address '{}' is not host:port", self.server.bind)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.server.external_timeout_secs)
    }
}
