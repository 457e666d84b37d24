//! Zero-cost rule-table tier.

use super::{IntentTier, TierContext};
use crate::rules::{self, RuleMatch};
use crate::types::{Intent, IntentType};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Strict,
    Lenient,
}

/// Resolves messages from the fixed phrase tables, with no external call.
///
/// The strict form runs first in the chain and applies the command and
/// deferral rules. The lenient form runs after the generative tier and
/// also accepts looser phrases ("영화", "보여").
#[derive(Debug, Clone, Copy)]
pub struct HeuristicTier {
    mode: Mode,
}

impl HeuristicTier {
    pub fn strict() -> Self {
        Self { mode: Mode::Strict }
    }

    pub fn lenient() -> Self {
        Self {
            mode: Mode::Lenient,
        }
    }
}

#[async_trait]
impl IntentTier for HeuristicTier {
    fn name(&self) -> &str {
        match self.mode {
            Mode::Strict => "heuristic",
            Mode::Lenient => "heuristic-lenient",
        }
    }

    async fn resolve(&self, context: &TierContext<'_>) -> Option<Intent> {
        let persona = context.config.persona;
        let text = persona.filler(IntentType::Recommendation);

        if let Some(rule) = rules::evaluate(context.message, context.state) {
            let keywords = match rule {
                RuleMatch::Command(keywords) => keywords,
                RuleMatch::Deferral => rules::generic_keywords(),
            };
            debug!("Rule table matched: {:?}", keywords);
            return Some(Intent::recommendation(text, keywords));
        }

        if self.mode == Mode::Lenient && rules::has_lenient_phrase(context.message) {
            let keywords = rules::hint_keywords(context.message);
            debug!("Lenient phrase matched: {:?}", keywords);
            return Some(Intent::recommendation(text, keywords));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatConfig, ConversationState};

    fn context<'a>(message: &'a str, config: &'a ChatConfig, state: ConversationState) -> TierContext<'a> {
        TierContext {
            message,
            history: &[],
            config,
            state,
        }
    }

    #[tokio::test]
    async fn test_strict_ignores_loose_phrases() {
        let config = ChatConfig::default();
        let ctx = context("영화 하나 보여봐", &config, ConversationState::AwaitingIntent);
        assert!(HeuristicTier::strict().resolve(&ctx).await.is_none());

        let intent = HeuristicTier::lenient().resolve(&ctx).await.unwrap();
        assert_eq!(intent.kind, IntentType::Recommendation);
        assert_eq!(intent.keywords, vec!["popular"]);
    }

    #[tokio::test]
    async fn test_deferral_uses_generic_keywords() {
        let config = ChatConfig::default();
        let ctx = context("딱히 없어", &config, ConversationState::FollowUpAsked);
        let intent = HeuristicTier::strict().resolve(&ctx).await.unwrap();
        assert_eq!(intent.keywords, vec!["popular", "trending", "top rated"]);
    }

    #[tokio::test]
    async fn test_small_talk_passes() {
        let config = ChatConfig::default();
        let ctx = context("배고파", &config, ConversationState::AwaitingIntent);
        assert!(HeuristicTier::strict().resolve(&ctx).await.is_none());
        assert!(HeuristicTier::lenient().resolve(&ctx).await.is_none());
    }
}
