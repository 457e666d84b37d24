//! The IntentClassifier runs tiers in order until one settles the message.

use crate::persona::FALLBACK_REPLY_TEXT;
use crate::rules;
use crate::tiers::{CacheTier, GenerativeTier, HeuristicTier, IntentCache, IntentTier, TierContext};
use crate::types::{ChatConfig, ConversationState, Intent, IntentType, Turn};
use genai_client::TextGenerator;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chains classifier tiers into a fallback pipeline.
///
/// ## Usage
/// ```ignore
/// let classifier = IntentClassifier::new()
///     .add_tier(HeuristicTier::strict())
///     .add_tier(CacheTier::new(intent_cache.clone()))
///     .add_tier(GenerativeTier::new(generator))
///     .add_tier(HeuristicTier::lenient())
///     .with_cache(intent_cache);
///
/// let intent = classifier.classify("우울한데 추천해줘", &history, &config).await;
/// ```
pub struct IntentClassifier {
    tiers: Vec<Box<dyn IntentTier>>,
    cache: Option<IntentCache>,
}

impl IntentClassifier {
    /// Create a classifier with no tiers (every message becomes a fallback reply)
    pub fn new() -> Self {
        Self {
            tiers: Vec::new(),
            cache: None,
        }
    }

    /// The standard chain: rules, cache, generative model, lenient rules
    pub fn standard(generator: Arc<dyn TextGenerator>, cache: IntentCache, temperature: f32) -> Self {
        Self::new()
            .add_tier(HeuristicTier::strict())
            .add_tier(CacheTier::new(cache.clone()))
            .add_tier(GenerativeTier::new(generator).with_temperature(temperature))
            .add_tier(HeuristicTier::lenient())
            .with_cache(cache)
    }

    /// Add a tier to the end of the chain (builder pattern)
    pub fn add_tier(mut self, tier: impl IntentTier + 'static) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    /// Cache where results of caching tiers are written
    pub fn with_cache(mut self, cache: IntentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    /// Classify one message. Never fails.
    ///
    /// ## Algorithm
    /// 1. Derive the conversation state from history
    /// 2. Try each tier in order; the first `Some` wins
    /// 3. Enforce the output invariants on the winner (see [`finalize`])
    /// 4. Write cacheable results of caching tiers to the intent cache, unless
///    step 3 changed the intent's kind
    /// 5. If every tier passes, return the fallback apology reply
    #[instrument(skip(self, history, config), fields(persona = config.persona.label()))]
    pub async fn classify(&self, message: &str, history: &[Turn], config: &ChatConfig) -> Intent {
        let context = TierContext {
            message,
            history,
            config,
            state: ConversationState::from_history(history),
        };
        debug!("Conversation state: {:?}", context.state);

        for tier in &self.tiers {
            debug!("Trying tier: {}", tier.name());
            let Some(intent) = tier.resolve(&context).await else {
                continue;
            };

            let resolved_kind = intent.kind;
            let intent = finalize(intent, &context);
            // A kind rewritten for this conversation's state must not leak into others
            if tier.caches_result() && intent.kind == resolved_kind {
                if let Some(cache) = &self.cache {
                    cache.save(message, &intent).await;
                }
            }
            info!(
                tier = tier.name(),
                kind = %intent.kind,
                keywords = ?intent.keywords,
                "Intent resolved"
            );
            return intent;
        }

        info!("No tier resolved the message, replying with fallback");
        Intent::reply(FALLBACK_REPLY_TEXT)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Enforce the output invariants on a resolved intent.
///
/// - A clarifying question is never asked twice in one conversation; a
///   second one becomes a generic recommendation
/// - A recommendation always carries keywords
/// - A search carries the title to look up (the message itself if none)
/// - Replies and clarifying questions carry no keywords
/// - Empty text is replaced by the persona's filler line
pub fn finalize(mut intent: Intent, context: &TierContext<'_>) -> Intent {
    let persona = context.config.persona;

    if intent.kind == IntentType::FollowUpQuestion && !context.state.allows_follow_up() {
        debug!("Follow-up already asked in this conversation, recommending instead");
        return Intent::recommendation(
            persona.filler(IntentType::Recommendation),
            rules::generic_keywords(),
        );
    }

    match intent.kind {
        IntentType::Recommendation if intent.keywords.is_empty() => {
            intent.keywords = rules::generic_keywords();
        }
        IntentType::SearchResult if intent.keywords.is_empty() => {
            intent.keywords = vec![context.message.trim().to_string()];
        }
        IntentType::Reply | IntentType::FollowUpQuestion => intent.keywords.clear(),
        _ => {}
    }

    if intent.text.trim().is_empty() {
        intent.text = persona.filler(intent.kind).to_string();
    }
    intent
}
