//! Classifier tiers.
//!
//! Each tier is one stage of the fallback chain: it either settles the
//! message or passes (`None`) to the next tier.

pub mod cache;
pub mod generative;
pub mod heuristic;

pub use cache::{CacheTier, CachedIntent, IntentCache, fingerprint};
pub use generative::GenerativeTier;
pub use heuristic::HeuristicTier;

use crate::types::{ChatConfig, ConversationState, Intent, Turn};
use async_trait::async_trait;

/// Everything a tier may look at for one message
#[derive(Debug, Clone, Copy)]
pub struct TierContext<'a> {
    pub message: &'a str,
    pub history: &'a [Turn],
    pub config: &'a ChatConfig,
    pub state: ConversationState,
}

/// Core trait for one classification stage.
///
/// ## Design Note
/// - Tiers never fail: an internal error is logged and reported as `None`
/// - `Send + Sync` so one classifier can serve concurrent requests
#[async_trait]
pub trait IntentTier: Send + Sync {
    /// Returns the name of this tier (for logging)
    fn name(&self) -> &str;

    /// Settle the message, or return `None` to defer to the next tier
    async fn resolve(&self, context: &TierContext<'_>) -> Option<Intent>;

    /// Whether intents from this tier should be written to the intent cache
    fn caches_result(&self) -> bool {
        false
    }
}
