//! The explicit rule table.
//!
//! These rules run before any cache lookup or generative call, and again
//! (in lenient form) after a failed generative call. Each function here
//! is pure, so the override and anti-repetition rules can be tested
//! without any external service.

use crate::types::ConversationState;
use catalog::Genre;

/// Keywords for recommendations forced without any genre signal
pub const GENERIC_KEYWORDS: [&str; 3] = ["popular", "trending", "top rated"];

/// Keywords for a recommendation asked for while feeling low
pub const MOOD_KEYWORDS: [&str; 2] = ["comedy", "feel-good"];

/// Keywords for an explicit request with no genre or mood signal
pub const DEFAULT_KEYWORDS: [&str; 1] = ["popular"];

/// Explicit requests to be shown titles.
///
/// A message containing any of these is a recommendation, even when the
/// same message also reads as small talk ("우울한데 추천해줘").
pub const COMMAND_PHRASES: &[&str] = &[
    "추천해줘",
    "추천해",
    "추천",
    "영화 줘",
    "영화 보여줘",
    "영화 찾아줘",
    "뭐 볼까",
    "볼만한 거",
    "볼거 없어",
    "그냥 줘",
    "아무거나 줘",
    "골라줘",
    "정해줘",
    "recommend",
    "suggest",
    "what should i watch",
    "something to watch",
    "pick a movie",
    "pick one for me",
];

/// Broader phrases accepted only when the generative tier has failed
pub const LENIENT_PHRASES: &[&str] = &[
    "영화", "보여", "찾아", "아무거나", "골라", "볼만한", "볼거", "movie", "watch",
];

/// Answers to a clarifying question that hand the choice back
pub const DEFERRAL_PHRASES: &[&str] = &[
    "딱히",
    "그냥",
    "아무거나",
    "모르겠어",
    "몰라",
    "네가 골라",
    "너가 골라",
    "상관없어",
    "whatever",
    "you choose",
    "you pick",
    "i don't know",
    "idk",
    "anything",
];

/// Signals of a low mood
pub const MOOD_WORDS: &[&str] = &[
    "우울", "힘들", "슬프", "지쳐", "피곤", "sad", "tired", "depressed", "exhausted",
];

/// Lowercase and drop all whitespace, so "영화줘" matches "영화 줘"
fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn contains_any(message: &str, phrases: &[&str]) -> bool {
    let message = compact(message);
    phrases.iter().any(|phrase| message.contains(&compact(phrase)))
}

pub fn has_command_phrase(message: &str) -> bool {
    contains_any(message, COMMAND_PHRASES)
}

pub fn has_lenient_phrase(message: &str) -> bool {
    contains_any(message, COMMAND_PHRASES) || contains_any(message, LENIENT_PHRASES)
}

pub fn has_deferral_phrase(message: &str) -> bool {
    contains_any(message, DEFERRAL_PHRASES)
}

pub fn has_mood_word(message: &str) -> bool {
    contains_any(message, MOOD_WORDS)
}

/// Endings that may follow a Korean genre term inside one word
const KOREAN_PARTICLES: &[&str] = &[
    "이", "가", "은", "는", "을", "를", "도", "만", "의", "에", "로", "으로", "랑", "이랑", "하고",
    "나", "이나", "들", "거", "걸", "것", "같은",
];

/// Nouns that compound with a genre term ("공포영화", "서부극", "액션물을")
const KOREAN_GENRE_NOUNS: &[&str] = &["영화", "장르", "물", "극", "류", "쪽", "계열"];

/// Genre keywords mentioned in the message, in dictionary order.
///
/// ASCII terms must appear as whole words ("sf", "war"). Korean terms
/// must start a word and be followed by nothing, a particle, or a genre
/// noun, so "서부극" counts but "여기서부터" and "멜로디" do not.
pub fn genre_hints(message: &str) -> Vec<String> {
    let lowered = message.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|word| !word.is_empty())
        .collect();

    Genre::ALL
        .into_iter()
        .filter(|genre| {
            genre.terms().any(|term| {
                let term = term.to_lowercase();
                if term.contains(' ') {
                    lowered.contains(&term)
                } else if term.is_ascii() {
                    words.contains(&term.as_str())
                } else {
                    words.iter().any(|word| korean_term_heads(word, &term))
                }
            })
        })
        .map(|genre| genre.keyword().to_string())
        .collect()
}

fn korean_term_heads(word: &str, term: &str) -> bool {
    match word.strip_prefix(term) {
        Some(rest) => {
            rest.is_empty()
                || KOREAN_PARTICLES.contains(&rest)
                || KOREAN_GENRE_NOUNS.iter().any(|noun| rest.starts_with(noun))
        }
        None => false,
    }
}

/// Keywords for a heuristic recommendation: genres, else mood, else popular
pub fn hint_keywords(message: &str) -> Vec<String> {
    let genres = genre_hints(message);
    if !genres.is_empty() {
        return genres;
    }
    let fallback: &[&str] = if has_mood_word(message) {
        &MOOD_KEYWORDS
    } else {
        &DEFAULT_KEYWORDS
    };
    fallback.iter().map(|k| k.to_string()).collect()
}

pub fn generic_keywords() -> Vec<String> {
    GENERIC_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Outcome of the rule table for one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    /// An explicit request; recommend with these keywords
    Command(Vec<String>),
    /// The user deferred after a clarifying question; recommend generically
    Deferral,
}

/// Apply the rules in precedence order.
///
/// ## Algorithm
/// 1. A command phrase wins over everything, including emotional content
/// 2. After a clarifying question, a deferral forces a generic recommendation
/// 3. Otherwise the rules have nothing to say
pub fn evaluate(message: &str, state: ConversationState) -> Option<RuleMatch> {
    if has_command_phrase(message) {
        return Some(RuleMatch::Command(hint_keywords(message)));
    }
    if state == ConversationState::FollowUpAsked && has_deferral_phrase(message) {
        return Some(RuleMatch::Deferral);
    }
    None
}
