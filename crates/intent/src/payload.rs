//! Parsing the generative service's classification payload.

use crate::types::{Intent, IntentType};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Response contains no JSON object")]
    NoJsonObject,

    #[error("Response JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown intent type '{0}'")]
    UnknownType(String),
}

#[derive(Debug, Deserialize)]
struct RawIntent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
}

/// Extract the intent from a model response.
///
/// The response may wrap the object in prose or code fences; everything
/// from the first `{` to the last `}` is parsed.
pub fn parse_intent_payload(raw: &str) -> Result<Intent, PayloadError> {
    let start = raw.find('{').ok_or(PayloadError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(PayloadError::NoJsonObject)?;
    if end < start {
        return Err(PayloadError::NoJsonObject);
    }

    let parsed: RawIntent = serde_json::from_str(&raw[start..=end])?;
    let kind = IntentType::parse(&parsed.kind).ok_or(PayloadError::UnknownType(parsed.kind))?;
    let keywords = parsed
        .keywords
        .unwrap_or_default()
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    Ok(Intent::new(
        kind,
        parsed.text.unwrap_or_default().trim(),
        keywords,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fenced_payload() {
        let raw = "```json\n{\"type\": \"search_result\", \"text\": \"듄 좋지!\", \"keywords\": [\" Dune \", \"\"]}\n```";
        let intent = parse_intent_payload(raw).unwrap();
        assert_eq!(intent.kind, IntentType::SearchResult);
        assert_eq!(intent.text, "듄 좋지!");
        assert_eq!(intent.keywords, vec!["Dune"]);
    }

    #[test]
    fn test_null_fields_default() {
        let intent =
            parse_intent_payload(r#"{"type":"recommendation","text":null,"keywords":null}"#).unwrap();
        assert_eq!(intent.kind, IntentType::Recommendation);
        assert!(intent.text.is_empty());
        assert!(intent.keywords.is_empty());
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert!(matches!(parse_intent_payload("no json here"), Err(PayloadError::NoJsonObject)));
        assert!(matches!(parse_intent_payload("} oops {"), Err(PayloadError::NoJsonObject)));
        assert!(matches!(parse_intent_payload("{type: reply}"), Err(PayloadError::Malformed(_))));
        assert!(matches!(
            parse_intent_payload(r#"{"type":"rant","text":"x"}"#),
            Err(PayloadError::UnknownType(t)) if t == "rant"
        ));
    }
}
