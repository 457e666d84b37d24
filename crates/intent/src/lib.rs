//! # Intent Crate
//!
//! Tiered intent classification for chat messages.
//!
//! ## Components
//!
//! ### Rule table ([`rules`])
//! Pure functions for the command-phrase override, the deferral rule
//! and keyword hints. Evaluated before anything that costs money.
//!
//! ### Tiers ([`tiers`])
//! - [`HeuristicTier`]: the rule table (strict first, lenient last)
//! - [`CacheTier`]: previously classified messages, keyed by fingerprint
//! - [`GenerativeTier`]: structured classification by the generative service
//!
//! ### Classifier ([`IntentClassifier`])
//! Runs the tiers in order, enforces the output invariants and writes
//! generative results to the intent cache. Never returns an error.
//!
//! ## Example Usage
//!
//! ```ignore
//! use intent::{ChatConfig, IntentCache, IntentClassifier};
//!
//! let cache = IntentCache::new(store.clone(), clock.clone());
//! let classifier = IntentClassifier::standard(generator, cache, 0.7);
//! let intent = classifier.classify("우울한데 추천해줘", &[], &ChatConfig::default()).await;
//! assert_eq!(intent.kind, IntentType::Recommendation);
//! ```

pub mod classifier;
pub mod payload;
pub mod persona;
pub mod prompt;
pub mod rules;
pub mod tiers;
pub mod types;

pub use classifier::IntentClassifier;
pub use payload::{PayloadError, parse_intent_payload};
pub use persona::{FALLBACK_REPLY_TEXT, Persona};
pub use tiers::{CacheTier, CachedIntent, GenerativeTier, HeuristicTier, IntentCache, IntentTier, TierContext};
pub use types::{ChatConfig, ConversationState, Intent, IntentType, Role, Turn};
