//! # Detail Enrichment
//!
//! Generated commentary and translated critical excerpts for one catalog
//! item, cached per item id in the detail namespace.
//!
//! ## Algorithm
//! 1. Look up the item id in the detail cache; a hit is returned as-is
//!    with zero generative calls
//! 2. On a miss, fetch the catalog detail and run commentary and excerpt
//!    generation concurrently
//! 3. Fill anything that failed with fixed fallback texts
//! 4. Upsert the result only when every part was generated (fallbacks are
//!    never cached, so the next request retries)
//!
//! Concurrent misses for the same id each generate and upsert; the last
//! write wins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use cache_store::{CacheStore, Clock, Namespace, StoredEntry};
use catalog::{CatalogClient, ItemId, MovieDetail, Result as CatalogResult, Review};
use genai_client::{GenAiError, GenerationRequest, TextGenerator};

use crate::detail_view::DetailView;

/// Longest commentary kept; the prompt asks for 30 characters
pub const MAX_COMMENTARY_CHARS: usize = 50;

/// Excerpts shown per item
pub const EXCERPT_COUNT: usize = 3;

/// Characters of each raw review sent for translation
pub const MAX_REVIEW_CHARS: usize = 500;

const ENRICHMENT_TEMPERATURE: f32 = 0.9;

pub const FALLBACK_COMMENTARY: &str = "이거 괜찮은데? 한번 봐봐 👀";

pub const NO_REVIEW_EXCERPTS: [&str; EXCERPT_COUNT] = [
    "아직 후기가 없네... 너가 첫 번째가 되어봐! ✨",
    "리뷰 기다리는 중~ 🎬",
    "평가 준비 중이야! 💫",
];

pub const FALLBACK_EXCERPTS: [&str; EXCERPT_COUNT] = [
    "해외에서도 인기 많은 작품이야! 🌎",
    "글로벌 평가 좋은 편~ ⭐",
    "다들 추천하는 거 보면 괜찮은 듯! 💯",
];

/// Pads a short translation up to [`EXCERPT_COUNT`]
pub const PADDING_EXCERPT: &str = "다들 좋아하는 작품이래! 👍";

/// What the detail cache stores per item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub item_id: ItemId,
    pub commentary: String,
    pub excerpts: Vec<String>,
}

#[derive(Clone)]
pub struct DetailEnricher {
    catalog: Arc<dyn CatalogClient>,
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl DetailEnricher {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            generator,
            store,
            clock,
        }
    }

    /// Commentary and excerpts for `id`, from the cache when present.
    ///
    /// `Ok(None)` when the catalog does not know the id.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, id: ItemId) -> CatalogResult<Option<Enrichment>> {
        if let Some(cached) = self.cached(id).await {
            return Ok(Some(cached));
        }
        let Some(detail) = self.catalog.detail(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.generate_and_store(&detail).await))
    }

    /// Regenerate the enrichment for `id`, overwriting any cached entry
    #[instrument(skip(self))]
    pub async fn regenerate(&self, id: ItemId) -> CatalogResult<Option<Enrichment>> {
        let Some(detail) = self.catalog.detail(id).await? else {
            return Ok(None);
        };
        info!("Regenerating enrichment for item {}", id);
        Ok(Some(self.generate_and_store(&detail).await))
    }

    /// The full detail view: catalog record plus enrichment
    #[instrument(skip(self))]
    pub async fn detail_view(&self, id: ItemId) -> CatalogResult<Option<DetailView>> {
        let Some(detail) = self.catalog.detail(id).await? else {
            return Ok(None);
        };

        let enrichment = match self.cached(id).await {
            Some(cached) => cached,
            None => self.generate_and_store(&detail).await,
        };
        Ok(Some(DetailView::assemble(&detail, enrichment)))
    }

    async fn cached(&self, id: ItemId) -> Option<Enrichment> {
        let key = id.to_string();
        let entry = match self.store.get(Namespace::Detail, &key).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Detail cache read failed for item {}: {}", id, e);
                return None;
            }
        };

        match serde_json::from_value::<Enrichment>(entry.value) {
            Ok(enrichment) => {
                info!("Detail cache HIT: item {}", id);
                Some(enrichment)
            }
            Err(e) => {
                warn!("Unreadable detail cache entry for item {}: {}", id, e);
                None
            }
        }
    }

    async fn generate_and_store(&self, detail: &MovieDetail) -> Enrichment {
        info!("Detail cache MISS: item {}", detail.id);

        let (commentary, excerpts) = tokio::join!(
            self.generate_commentary(detail),
            self.translate_excerpts(&detail.reviews),
        );
        let complete = commentary.is_ok() && excerpts.is_ok();

        let enrichment = Enrichment {
            item_id: detail.id,
            commentary: commentary.unwrap_or_else(|e| {
                warn!("Commentary generation failed for item {}: {}", detail.id, e);
                FALLBACK_COMMENTARY.to_string()
            }),
            excerpts: excerpts.unwrap_or_else(|e| {
                warn!("Excerpt translation failed for item {}: {}", detail.id, e);
                FALLBACK_EXCERPTS.iter().map(|s| s.to_string()).collect()
            }),
        };

        if complete {
            self.store_enrichment(&enrichment).await;
        }
        enrichment
    }

    async fn store_enrichment(&self, enrichment: &Enrichment) {
        let value = match serde_json::to_value(enrichment) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize enrichment: {}", e);
                return;
            }
        };
        let entry = StoredEntry::new(value, self.clock.now());
        let key = enrichment.item_id.to_string();
        match self.store.put(Namespace::Detail, &key, entry).await {
            Ok(()) => info!("Detail cache SAVE: item {}", enrichment.item_id),
            Err(e) => warn!("Detail cache write failed for item {}: {}", enrichment.item_id, e),
        }
    }

    async fn generate_commentary(&self, detail: &MovieDetail) -> Result<String, GenAiError> {
        let request = GenerationRequest::new(commentary_prompt(detail)).with_temperature(ENRICHMENT_TEMPERATURE);
        let raw = self.generator.generate(&request).await?;
        let commentary = clean_commentary(&raw);
        if commentary.is_empty() {
            return Err(GenAiError::EmptyResponse);
        }
        Ok(commentary)
    }

    async fn translate_excerpts(&self, reviews: &[Review]) -> Result<Vec<String>, GenAiError> {
        if reviews.is_empty() {
            return Ok(NO_REVIEW_EXCERPTS.iter().map(|s| s.to_string()).collect());
        }
        let request = GenerationRequest::new(excerpt_prompt(reviews))
            .with_temperature(ENRICHMENT_TEMPERATURE)
            .expect_json();
        let raw = self.generator.generate(&request).await?;
        Ok(parse_excerpts(&raw))
    }
}

// =============================================================================
// Prompts and Parsing
// =============================================================================

fn commentary_prompt(detail: &MovieDetail) -> String {
    let overview = if detail.overview.trim().is_empty() {
        "줄거리 정보 없음"
    } else {
        detail.overview.trim()
    };
    format!(
        "친구에게 영화를 추천하듯이 아래 작품의 한 줄 평을 써줘.\n\
         \n\
         제목: {}\n\
         줄거리: {}\n\
         \n\
         - 반말로 편하게, 이모지 1~2개\n\
         - 30자 이내\n\
         - 한 줄 평만 답해. 설명은 붙이지 마.",
        detail.title, overview
    )
}

fn excerpt_prompt(reviews: &[Review]) -> String {
    let numbered: Vec<String> = reviews
        .iter()
        .take(EXCERPT_COUNT)
        .enumerate()
        .map(|(i, review)| {
            let content: String = review.content.chars().take(MAX_REVIEW_CHARS).collect();
            format!("{}. {}", i + 1, content.trim())
        })
        .collect();
    format!(
        "아래 영어 리뷰를 친구 말투의 한국어 한 줄 요약으로 바꿔줘.\n\
         \n\
         리뷰:\n{}\n\
         \n\
         - 리뷰마다 40자 이내, 이모지 포함\n\
         - 문자열 {}개짜리 JSON 배열로만 답해. 예: [\"...\", \"...\", \"...\"]",
        numbered.join("\n"),
        EXCERPT_COUNT
    )
}

/// Trim, strip one pair of surrounding quotes, cap the length
pub fn clean_commentary(raw: &str) -> String {
    let text = raw.trim();
    let text = text.strip_prefix(['"', '\'']).unwrap_or(text);
    let text = text.strip_suffix(['"', '\'']).unwrap_or(text);
    text.trim().chars().take(MAX_COMMENTARY_CHARS).collect()
}

/// Read translated excerpts from a model answer.
///
/// Prefers a JSON array of strings; otherwise splits into lines and
/// drops list numbering. Always returns exactly [`EXCERPT_COUNT`] entries.
pub fn parse_excerpts(raw: &str) -> Vec<String> {
    let from_json = match (raw.find('['), raw.rfind(']')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str::<Vec<String>>(&raw[start..=end]).ok(),
        _ => None,
    };
    let candidates = from_json.unwrap_or_else(|| raw.lines().map(strip_list_marker).collect());

    let mut excerpts: Vec<String> = candidates
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .take(EXCERPT_COUNT)
        .collect();
    while excerpts.len() < EXCERPT_COUNT {
        excerpts.push(PADDING_EXCERPT.to_string());
    }
    excerpts
}

fn strip_list_marker(line: &str) -> String {
    let line = line.trim_start();
    if let Some(rest) = line.strip_prefix("- ") {
        return rest.to_string();
    }
    let without_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() < line.len() {
        if let Some(rest) = without_digits.strip_prefix(['.', ')']) {
            return rest.to_string();
        }
    }
    line.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_commentary_strips_quotes_and_caps_length() {
        assert_eq!(clean_commentary("  \"영상미 미쳤음 🔥\"\n"), "영상미 미쳤음 🔥");
        assert_eq!(clean_commentary("'짧고 굵게'"), "짧고 굵게");

        let long = "가".repeat(80);
        assert_eq!(clean_commentary(&long).chars().count(), MAX_COMMENTARY_CHARS);
    }

    #[test]
    fn test_parse_excerpts_from_json_array() {
        let raw = "여기 있어:\n[\"첫 번째 🎬\", \"두 번째 ⭐\", \"세 번째 💯\", \"네 번째\"]";
        assert_eq!(parse_excerpts(raw), vec!["첫 번째 🎬", "두 번째 ⭐", "세 번째 💯"]);
    }

    #[test]
    fn test_parse_excerpts_line_fallback_and_padding() {
        let raw = "1. 기대 안 했는데 정주행함 ㅋㅋ\n\n2) 배우 연기 미쳤음";
        assert_eq!(
            parse_excerpts(raw),
            vec!["기대 안 했는데 정주행함 ㅋㅋ", "배우 연기 미쳤음", PADDING_EXCERPT]
        );
    }

    #[test]
    fn test_parse_excerpts_empty_answer_is_all_padding() {
        assert_eq!(parse_excerpts("   "), vec![PADDING_EXCERPT; EXCERPT_COUNT]);
    }

    #[test]
    fn test_excerpt_prompt_caps_reviews() {
        let reviews: Vec<Review> = (0..5)
            .map(|i| Review {
                author: format!("critic{}", i),
                content: "x".repeat(900),
            })
            .collect();
        let prompt = excerpt_prompt(&reviews);
        assert!(prompt.contains("3. "));
        assert!(!prompt.contains("4. "));
        assert!(!prompt.contains(&"x".repeat(MAX_REVIEW_CHARS + 1)));
    }
}
