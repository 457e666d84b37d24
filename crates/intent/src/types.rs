//! Core types for intent classification.

use crate::persona::Persona;
use catalog::ItemId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Intent
// =============================================================================

/// What the user wants from one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    /// Small talk or empathy, no catalog lookup
    Reply,
    /// A request to be shown titles
    Recommendation,
    /// A lookup of one named title
    SearchResult,
    /// A clarifying question back to the user
    FollowUpQuestion,
}

impl IntentType {
    pub fn as_str(self) -> &'static str {
        match self {
            IntentType::Reply => "reply",
            IntentType::Recommendation => "recommendation",
            IntentType::SearchResult => "search_result",
            IntentType::FollowUpQuestion => "follow_up_question",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "reply" => Some(IntentType::Reply),
            "recommendation" => Some(IntentType::Recommendation),
            "search_result" => Some(IntentType::SearchResult),
            "follow_up_question" => Some(IntentType::FollowUpQuestion),
            _ => None,
        }
    }

    /// Whether this intent type carries keywords
    pub fn needs_keywords(self) -> bool {
        matches!(self, IntentType::Recommendation | IntentType::SearchResult)
    }

    /// Only conversation-independent intents may be served from the cache
    pub fn is_cacheable(self) -> bool {
        self.needs_keywords()
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured classification of one chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub kind: IntentType,
    /// User-facing text in the persona's voice
    pub text: String,
    /// Genre/mood keywords for recommendations, the title for searches
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Intent {
    pub fn new(kind: IntentType, text: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            keywords,
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self::new(IntentType::Reply, text, Vec::new())
    }

    pub fn recommendation(text: impl Into<String>, keywords: Vec<String>) -> Self {
        Self::new(IntentType::Recommendation, text, keywords)
    }
}

// =============================================================================
// Conversation History
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

/// One prior turn, as echoed back by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    /// Message text; non-string payloads are kept as their JSON text
    #[serde(alias = "parts", deserialize_with = "content_as_text", default)]
    pub content: String,
    /// Intent type of an assistant turn, when the caller recorded it
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<IntentType>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: None,
        }
    }

    pub fn assistant(content: impl Into<String>, kind: IntentType) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: Some(kind),
        }
    }
}

fn content_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Where a conversation stands with respect to clarifying questions.
///
/// Derived from history on every request; the classifier keeps no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// No clarifying question asked yet
    AwaitingIntent,
    /// The latest assistant turn was a clarifying question
    FollowUpAsked,
    /// A clarifying question was asked earlier and has been answered
    Resolved,
}

impl ConversationState {
    pub fn from_history(history: &[Turn]) -> Self {
        let mut assistant_kinds = history
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::Assistant)
            .map(|turn| turn.kind);

        match assistant_kinds.next() {
            None => ConversationState::AwaitingIntent,
            Some(Some(IntentType::FollowUpQuestion)) => ConversationState::FollowUpAsked,
            Some(_) => {
                if assistant_kinds.any(|kind| kind == Some(IntentType::FollowUpQuestion)) {
                    ConversationState::Resolved
                } else {
                    ConversationState::AwaitingIntent
                }
            }
        }
    }

    /// A clarifying question may be asked at most once per conversation
    pub fn allows_follow_up(self) -> bool {
        self == ConversationState::AwaitingIntent
    }
}

// =============================================================================
// Per-request Configuration
// =============================================================================

/// The caller's chat settings for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    pub persona: Persona,
    /// Subscribed streaming services
    #[serde(alias = "ott_filters")]
    pub ott_filters: Vec<String>,
    /// Items the user has already seen; never recommended again
    #[serde(alias = "seen_list_tmdb_ids")]
    pub excluded_ids: Vec<ItemId>,
    /// Titles the user likes
    #[serde(alias = "taste_profile_titles")]
    pub taste_profile: Vec<String>,
}
