//! Generative-model tier for messages the rules cannot settle.

use super::{IntentTier, TierContext};
use crate::payload::parse_intent_payload;
use crate::prompt::build_system_instruction;
use crate::types::{Intent, Role, Turn};
use async_trait::async_trait;
use genai_client::{ChatTurn, GenerationRequest, TextGenerator};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Asks the generative service for a structured classification.
///
/// A failed call or an unparseable answer passes to the next tier.
pub struct GenerativeTier {
    generator: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl GenerativeTier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Configure sampling temperature (default: 0.7)
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request(&self, context: &TierContext<'_>) -> GenerationRequest {
        let instruction =
            build_system_instruction(context.config.persona, context.config, context.state);
        GenerationRequest::new(format!("사용자 메시지: {}", context.message))
            .with_system_instruction(instruction)
            .with_history(to_chat_turns(context.history))
            .with_temperature(self.temperature)
            .expect_json()
    }
}

fn to_chat_turns(history: &[Turn]) -> Vec<ChatTurn> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::User => ChatTurn::user(turn.content.clone()),
            Role::Assistant => ChatTurn::model(turn.content.clone()),
        })
        .collect()
}

#[async_trait]
impl IntentTier for GenerativeTier {
    fn name(&self) -> &str {
        "generative"
    }

    async fn resolve(&self, context: &TierContext<'_>) -> Option<Intent> {
        let request = self.build_request(context);
        let raw = match self.generator.generate(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Generative classification failed: {}", e);
                return None;
            }
        };
        debug!("Generative raw response: {}", raw);

        match parse_intent_payload(&raw) {
            Ok(intent) => Some(intent),
            Err(e) => {
                warn!("Discarding generative response: {}", e);
                None
            }
        }
    }

    fn caches_result(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatConfig, ConversationState, IntentType};
    use genai_client::GenAiError;
    use std::sync::Mutex;

    /// Returns a fixed answer and records the last request
    struct RecordingGenerator {
        answer: Result<String, ()>,
        last: Mutex<Option<GenerationRequest>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenAiError> {
            *self.last.lock().unwrap() = Some(request.clone());
            self.answer.clone().map_err(|_| GenAiError::EmptyResponse)
        }
    }

    fn tier(answer: Result<String, ()>) -> (GenerativeTier, Arc<RecordingGenerator>) {
        let generator = Arc::new(RecordingGenerator {
            answer,
            last: Mutex::new(None),
        });
        (GenerativeTier::new(generator.clone()), generator)
    }

    #[tokio::test]
    async fn test_parses_model_answer_and_sends_history() {
        let (tier, generator) = tier(Ok(
            r#"{"type":"search_result","text":"듄? 좋지","keywords":["Dune"]}"#.to_string(),
        ));
        let history = vec![
            Turn::user("안녕"),
            Turn::assistant("안녕!", IntentType::Reply),
        ];
        let config = ChatConfig::default();
        let ctx = TierContext {
            message: "듄 어때?",
            history: &history,
            config: &config,
            state: ConversationState::AwaitingIntent,
        };

        let intent = tier.resolve(&ctx).await.unwrap();
        assert_eq!(intent.kind, IntentType::SearchResult);
        assert_eq!(intent.keywords, vec!["Dune"]);

        let request = generator.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.prompt, "사용자 메시지: 듄 어때?");
        assert!(request.json_response);
        assert_eq!(request.temperature, Some(DEFAULT_TEMPERATURE));
    }

    #[tokio::test]
    async fn test_failures_pass_to_next_tier() {
        let config = ChatConfig::default();
        let ctx = TierContext {
            message: "음...",
            history: &[],
            config: &config,
            state: ConversationState::AwaitingIntent,
        };

        let (failing, _) = tier(Err(()));
        assert!(failing.resolve(&ctx).await.is_none());

        let (garbled, _) = tier(Ok("I think it is a reply".to_string()));
        assert!(garbled.resolve(&ctx).await.is_none());
    }
}
