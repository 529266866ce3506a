//! Preference learning: rule extraction, accumulation, and strategies
//!
//! The heart of the feedback loop. Extraction turns a free-text analysis
//! into canonical rules, the store accumulates them across rounds, and the
//! two strategies decide how an edit becomes an analysis in the first
//! place.

pub mod extract;
pub mod store;
pub mod strategy;

pub use extract::extract_rules;
pub use store::PreferenceStore;
pub use strategy::{DirectStrategy, JustifiedStrategy, LearningStrategy, StrategyOutcome};
