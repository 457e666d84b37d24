//! Intent cache and the tier that reads it.

use super::{IntentTier, TierContext};
use crate::types::{Intent, IntentType};
use async_trait::async_trait;
use cache_store::{CacheStore, Clock, Namespace, StoredEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Normalize a message into its cache key.
///
/// Lowercased, punctuation removed, whitespace runs collapsed, so
/// "추천해줘!!" and "추천해줘" share an entry.
pub fn fingerprint(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// What the cache remembers about a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedIntent {
    pub fingerprint: String,
    pub intent_type: IntentType,
    pub keywords: Vec<String>,
}

/// Classified intents keyed by message fingerprint.
///
/// Entries never expire; stale ones are removed with [`IntentCache::invalidate`].
/// Every store failure is logged and reported as a miss.
#[derive(Clone)]
pub struct IntentCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl IntentCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn lookup(&self, message: &str) -> Option<CachedIntent> {
        let key = fingerprint(message);
        if key.is_empty() {
            return None;
        }

        let entry = match self.store.get(Namespace::Intent, &key).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Intent cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_value::<CachedIntent>(entry.value) {
            Ok(cached) if cached.intent_type.is_cacheable() => Some(cached),
            Ok(cached) => {
                warn!("Ignoring cached {} intent for '{}'", cached.intent_type, key);
                None
            }
            Err(e) => {
                warn!("Unreadable intent cache entry '{}': {}", key, e);
                None
            }
        }
    }

    /// Remember a classified intent; intents that depend on the
    /// conversation (reply, follow-up) are skipped
    pub async fn save(&self, message: &str, intent: &Intent) {
        let key = fingerprint(message);
        if key.is_empty() || !intent.kind.is_cacheable() {
            return;
        }

        let cached = CachedIntent {
            fingerprint: key.clone(),
            intent_type: intent.kind,
            keywords: intent.keywords.clone(),
        };
        let value = match serde_json::to_value(&cached) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize intent for cache: {}", e);
                return;
            }
        };

        let entry = StoredEntry::new(value, self.clock.now());
        match self.store.put(Namespace::Intent, &key, entry).await {
            Ok(()) => info!("Intent cache SAVE: '{}' -> {}", key, intent.kind),
            Err(e) => warn!("Intent cache write failed: {}", e),
        }
    }

    /// Drop the cached intent for `message`; returns whether one existed
    pub async fn invalidate(&self, message: &str) -> bool {
        let key = fingerprint(message);
        match self.store.delete(Namespace::Intent, &key).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Intent cache delete failed: {}", e);
                false
            }
        }
    }
}

/// Serves previously classified messages without a generative call.
///
/// The user-facing text is the persona's fixed filler line.
pub struct CacheTier {
    cache: IntentCache,
}

impl CacheTier {
    pub fn new(cache: IntentCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl IntentTier for CacheTier {
    fn name(&self) -> &str {
        "cache"
    }

    async fn resolve(&self, context: &TierContext<'_>) -> Option<Intent> {
        let cached = self.cache.lookup(context.message).await?;
        info!("Intent cache HIT: '{}'", cached.fingerprint);
        let text = context.config.persona.filler(cached.intent_type);
        Some(Intent::new(cached.intent_type, text, cached.keywords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;
    use crate::types::{ChatConfig, ConversationState};
    use cache_store::{ManualClock, MemoryCacheStore};

    fn cache() -> (IntentCache, Arc<MemoryCacheStore>) {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = IntentCache::new(store.clone(), Arc::new(ManualClock::default()));
        (cache, store)
    }

    #[test]
    fn test_fingerprint_normalizes() {
        assert_eq!(fingerprint("  Dune  어때?? "), "dune 어때");
        assert_eq!(fingerprint("추천해줘!!"), fingerprint("추천해줘"));
        assert_eq!(fingerprint("?!"), "");
    }

    #[tokio::test]
    async fn test_save_lookup_invalidate() {
        let (cache, _store) = cache();
        let intent = Intent::new(IntentType::SearchResult, "찾아볼게", vec!["Dune".into()]);
        cache.save("듄 어때?", &intent).await;

        let hit = cache.lookup("듄 어때").await.unwrap();
        assert_eq!(hit.intent_type, IntentType::SearchResult);
        assert_eq!(hit.keywords, vec!["Dune"]);

        assert!(cache.invalidate("듄   어때!").await);
        assert!(cache.lookup("듄 어때").await.is_none());
    }

    #[tokio::test]
    async fn test_conversation_dependent_intents_are_not_saved() {
        let (cache, store) = cache();
        cache.save("안녕", &Intent::reply("안녕!")).await;
        cache
            .save("뭐 없나", &Intent::new(IntentType::FollowUpQuestion, "장르는?", vec![]))
            .await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cache_tier_uses_persona_filler() {
        let (cache, _store) = cache();
        cache
            .save("웃긴 거", &Intent::recommendation("모델이 쓴 문장", vec!["comedy".into()]))
            .await;

        let config = ChatConfig {
            persona: Persona::Tsundere,
            ..Default::default()
        };
        let ctx = TierContext {
            message: "웃긴 거",
            history: &[],
            config: &config,
            state: ConversationState::AwaitingIntent,
        };
        let intent = CacheTier::new(cache).resolve(&ctx).await.unwrap();
        assert_eq!(intent.text, Persona::Tsundere.filler(IntentType::Recommendation));
        assert_eq!(intent.keywords, vec!["comedy"]);
    }
}
