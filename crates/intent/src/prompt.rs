//! Classification instruction for the generative tier.

use crate::persona::Persona;
use crate::rules::{COMMAND_PHRASES, GENERIC_KEYWORDS};
use crate::types::{ChatConfig, ConversationState};
use catalog::Genre;

/// Korean command phrases quoted back to the model
fn command_examples() -> String {
    COMMAND_PHRASES
        .iter()
        .filter(|phrase| !phrase.is_ascii())
        .map(|phrase| format!("\"{}\"", phrase))
        .collect::<Vec<_>>()
        .join(", ")
}

fn genre_vocabulary() -> String {
    Genre::ALL
        .iter()
        .map(|genre| genre.keyword())
        .collect::<Vec<_>>()
        .join(", ")
}

fn or_none(values: &[String], none: &str) -> String {
    if values.is_empty() {
        none.to_string()
    } else {
        values.join(", ")
    }
}

/// Build the system instruction for one classification call.
///
/// The rule table has already run, so the model only sees messages the
/// rules could not settle; the rules are restated so its answer stays
/// consistent with them.
pub fn build_system_instruction(
    persona: Persona,
    config: &ChatConfig,
    state: ConversationState,
) -> String {
    let follow_up_rule = if state.allows_follow_up() {
        "- follow_up_question은 대화 전체에서 최대 1회만 허용돼. 요청이 너무 막연할 때만 써."
    } else {
        "- 이 대화에서는 이미 추가 질문을 했어. follow_up_question은 절대 쓰지 말고 recommendation으로 답해."
    };

    let seen = if config.excluded_ids.is_empty() {
        "없음".to_string()
    } else {
        config
            .excluded_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"{persona}

너의 역할: 사용자의 메시지를 분석해서 의도를 4가지 중 하나로 분류해.
- "reply": 단순 잡담이나 공감 (예: "힘들어", "오늘 날씨 좋다")
- "recommendation": 영화 추천 요청 (예: "가볍게 볼 만한 거", "웃긴 거")
- "search_result": 특정 작품명 언급 (예: "듄 어때?", "인터스텔라 재밌어?")
- "follow_up_question": 추천을 위해 추가 질문이 필요할 때

규칙:
- 메시지에 명령 표현({commands})이 있으면 공감보다 추천이 우선이야. 무조건 recommendation.
{follow_up_rule}
- 추가 질문 뒤에 "딱히", "그냥", "아무거나", "모르겠어", "네가 골라" 같은 답이 오면 다시 묻지 말고 recommendation, keywords: [{generic}].

응답은 반드시 아래 JSON 하나만 반환해. 다른 설명은 쓰지 마.
{{"type": "...", "text": "사용자에게 할 말 (페르소나 말투)", "keywords": ["..."]}}

keywords 규칙:
- recommendation: 영어 키워드만. 장르: {genres}. 분위기: popular, trending, top rated, feel-good.
- search_result: 작품 제목 하나 (예: ["Dune"]).
- reply, follow_up_question: 빈 배열 [].

사용자 정보:
- 좋아하는 작품: {taste}
- 구독 OTT: {ott}
- 이미 본 작품 (추천 금지): {seen}"#,
        persona = persona.prompt_fragment(),
        commands = command_examples(),
        follow_up_rule = follow_up_rule,
        generic = GENERIC_KEYWORDS
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", "),
        genres = genre_vocabulary(),
        taste = or_none(&config.taste_profile, "아직 없음"),
        ott = or_none(&config.ott_filters, "없음"),
        seen = seen,
    )
}
