//! Conversational personas.

use crate::types::IntentType;
use serde::{Deserialize, Serialize};

/// Apology used when no tier produced an intent
pub const FALLBACK_REPLY_TEXT: &str = "아, 잠깐 생각 좀 해볼게... 다시 한번 말해줄래?";

/// The voice the assistant speaks in.
///
/// Unknown labels fall back to [`Persona::Friendly`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Persona {
    /// 다정한 친구: warm, upbeat, lots of emoji
    #[default]
    Friendly,
    /// 츤데레 친구: feigns indifference, helps anyway
    Tsundere,
}

impl Persona {
    pub fn label(self) -> &'static str {
        match self {
            Persona::Friendly => "다정한 친구",
            Persona::Tsundere => "츤데레 친구",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "츤데레 친구" | "츤데레" | "tsundere" => Persona::Tsundere,
            _ => Persona::Friendly,
        }
    }

    /// Voice instructions placed at the top of the classification prompt
    pub fn prompt_fragment(self) -> &'static str {
        match self {
            Persona::Friendly => {
                "너는 사용자의 다정한 친구야.\n\
                 항상 밝고 긍정적인 톤으로 대화하고, 이모지를 자주 사용해서 친근함을 표현해.\n\
                 추천할 때는 \"이거 진짜 꿀잼이야! 너 좋아할 것 같은데?\" 같이 말해."
            }
            Persona::Tsundere => {
                "너는 겉으로는 쿨한 척하지만 속은 따뜻한 츤데레 친구야.\n\
                 \"별로 관심 없는데... 그래도 이거 괜찮더라\" 같은 말투를 써.\n\
                 도도하지만 결국엔 친절하게 추천해줘."
            }
        }
    }

    /// Fixed text for intents resolved without a generative call.
    ///
    /// Every cache hit of the same type gets the same line, whatever the
    /// underlying keywords were.
    pub fn filler(self, kind: IntentType) -> &'static str {
        match (self, kind) {
            (Persona::Friendly, IntentType::Reply) => "응응, 듣고 있어! 더 얘기해줘 😊",
            (Persona::Friendly, IntentType::Recommendation) => "알았어! 지금 바로 꿀잼 영화 찾아줄게! 😎",
            (Persona::Friendly, IntentType::SearchResult) => "오 그거! 바로 찾아볼게 🔍",
            (Persona::Friendly, IntentType::FollowUpQuestion) => "어떤 분위기 영화가 땡겨? 😊",
            (Persona::Tsundere, IntentType::Reply) => "흥, 뭐... 들어는 줄게.",
            (Persona::Tsundere, IntentType::Recommendation) => "뭐, 이 정도는 볼 만하긴 한데... 골라줬어.",
            (Persona::Tsundere, IntentType::SearchResult) => "그거? 찾아보긴 할게. 너 때문은 아니고.",
            (Persona::Tsundere, IntentType::FollowUpQuestion) => "...그래서, 어떤 거 보고 싶은데?",
        }
    }
}

impl From<String> for Persona {
    fn from(label: String) -> Self {
        Persona::from_label(&label)
    }
}

impl From<Persona> for String {
    fn from(persona: Persona) -> Self {
        persona.label().to_string()
    }
}
