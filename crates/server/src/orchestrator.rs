//! # Chat Orchestrator
//!
//! Coordinates one chat turn:
//! 1. Classify the message (tiered classifier, never fails)
//! 2. For `recommendation`, retrieve items for the keywords, skipping seen ids
//! 3. For `search_result`, look up the single best title match
//! 4. Assemble the response the client renders
//!
//! Catalog failures surface as an empty recommendation list; the caller
//! treats an empty list as "nothing to show".

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use catalog::{CatalogItem, ItemId};
use intent::{ChatConfig, Intent, IntentClassifier, IntentType, Turn};
use retriever::RecommendationRetriever;

/// Recommendations returned per chat answer when not configured otherwise
pub const DEFAULT_LIMIT: usize = 3;

/// One item card in a chat answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCard {
    pub id: ItemId,
    pub title: String,
    pub poster_ref: Option<String>,
    pub rating: f32,
}

impl From<CatalogItem> for RecommendationCard {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            poster_ref: item.poster_ref,
            rating: item.rating,
        }
    }
}

/// Response body for `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    #[serde(rename = "type")]
    pub kind: IntentType,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<RecommendationCard>>,
}

impl ChatResponse {
    fn from_intent(intent: Intent, recommendations: Option<Vec<RecommendationCard>>) -> Self {
        Self {
            kind: intent.kind,
            text: intent.text,
            keywords: intent.keywords,
            recommendations,
        }
    }
}

#[derive(Clone)]
pub struct ChatOrchestrator {
    classifier: Arc<IntentClassifier>,
    retriever: Arc<RecommendationRetriever>,
    limit: usize,
}

impl ChatOrchestrator {
    pub fn new(classifier: Arc<IntentClassifier>, retriever: Arc<RecommendationRetriever>) -> Self {
        Self {
            classifier,
            retriever,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Configure the number of recommendations per answer (default: 3)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Handle one chat turn.
    ///
    /// Only panics or timeouts in the layers below can stop this from
    /// producing a response; the HTTP layer contains both.
    pub async fn handle(&self, message: &str, history: &[Turn], config: &ChatConfig) -> ChatResponse {
        let start_time = Instant::now();

        let intent = self.classifier.classify(message, history, config).await;
        info!(
            "Classified message as {} with keywords {:?}",
            intent.kind, intent.keywords
        );

        let recommendations = match intent.kind {
            IntentType::Recommendation => Some(self.recommend(&intent.keywords, config).await),
            IntentType::SearchResult => self.search(&intent.keywords).await,
            IntentType::Reply | IntentType::FollowUpQuestion => None,
        };

        info!(
            "Answered chat turn in {:.2?} ({} cards)",
            start_time.elapsed(),
            recommendations.as_ref().map_or(0, Vec::len)
        );
        ChatResponse::from_intent(intent, recommendations)
    }

    async fn recommend(&self, keywords: &[String], config: &ChatConfig) -> Vec<RecommendationCard> {
        let excluded: HashSet<ItemId> = config.excluded_ids.iter().copied().collect();
        let items = self.retriever.retrieve(keywords, &excluded, self.limit).await;
        if items.is_empty() {
            warn!("No recommendations found for keywords {:?}", keywords);
        }
        items.into_iter().map(RecommendationCard::from).collect()
    }

    async fn search(&self, keywords: &[String]) -> Option<Vec<RecommendationCard>> {
        let title = keywords.first()?;
        match self.retriever.find_title(title).await {
            Some(item) => Some(vec![item.into()]),
            None => {
                info!("No catalog match for title '{}'", title);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_omits_optional_fields() {
        let response = ChatResponse::from_intent(Intent::reply("안녕!"), None);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "reply");
        assert_eq!(json["text"], "안녕!");
        assert!(json.get("keywords").is_none());
        assert!(json.get("recommendations").is_none());
    }

    #[test]
    fn test_card_wire_names() {
        let card = RecommendationCard {
            id: 550,
            title: "파이트 클럽".into(),
            poster_ref: Some("/p.jpg".into()),
            rating: 8.4,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["posterRef"], "/p.jpg");
        assert_eq!(json["id"], 550);
    }
}
