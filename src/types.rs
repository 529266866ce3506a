//! Core data types for the Aidos elicitation system
//!
//! This module defines the fundamental data structures used throughout aidos:
//! scenarios, generation results, learned preference rules and entries, and
//! the per-round interaction records that make up the durable session log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single elicitation scenario
///
/// Immutable once loaded. The `id` is stable and externally assigned by the
/// scenario corpus; the trace is kept opaque because its internal structure
/// is owned by the corpus, not by the learning loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Stable, externally assigned scenario identifier
    pub id: u32,

    /// The user instruction the response must address
    pub instruction: String,

    /// Capability names available when producing the response
    pub toolkits: Vec<String>,

    /// Observed execution trace, opaque structured data
    pub trace: serde_json::Value,
}

/// Result of a single text generation call
///
/// Transient: produced once per call and consumed immediately by the round
/// loop. `complete_prompt` is the exact prompt sent to the service,
/// including any injected preference block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated response text
    pub response: String,

    /// The full prompt that was actually sent
    pub complete_prompt: String,
}

/// A canonical learned preference rule: `For <information type>: <directive>`
///
/// Wraps the canonical string form so rules can be injected into prompts and
/// serialized into the session log as plain strings. Construction validates
/// that both components are non-empty after trimming; malformed fragments
/// are dropped at extraction time, never partially stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceRule(String);

impl PreferenceRule {
    /// Build a rule from its information type and disclosure directive.
    ///
    /// Returns `None` when either component is empty after trimming.
    pub fn new(information_type: &str, directive: &str) -> Option<Self> {
        let information_type = information_type.trim();
        let directive = directive.trim();
        if information_type.is_empty() || directive.is_empty() {
            return None;
        }
        Some(Self(format!("For {}: {}", information_type, directive)))
    }

    /// The canonical string form used for prompt injection and logging
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PreferenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Preferences learned from one completed round
///
/// Created exactly once per round by the active learning strategy and owned
/// by the preference store afterwards. `raw_analysis` keeps the full
/// analysis text for audit even when no rules could be extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    /// Scenario the preferences were learned from
    pub scenario_id: u32,

    /// Extracted rules, in the order they appeared in the analysis
    pub rules: Vec<PreferenceRule>,

    /// Full analysis text the rules were extracted from
    pub raw_analysis: String,
}

/// One follow-up question and the user's answer to it (justified mode only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationPair {
    pub question: String,
    pub justification: String,
}

/// Full record of one completed round, appended to the durable session log
///
/// The serialized shape is the interchange format consumed by the offline
/// evaluation tooling and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// 1-based round number within the run
    pub round_number: usize,

    /// Scenario the round was driven by
    pub scenario_id: u32,

    /// When the round completed
    pub timestamp: DateTime<Utc>,

    /// Scenario context shown to the model
    pub user_instruction: String,
    pub toolkits: Vec<String>,

    /// Rendered scenario prompt, before preference injection
    pub base_prompt: String,

    /// Preference rules active for this round's adjusted generation
    pub preferences_used: Vec<String>,

    /// The exact prompt sent for the adjusted generation
    pub complete_prompt: String,

    /// Response generated without any learned preferences
    pub baseline_response: String,

    /// Response generated with the active preferences injected
    pub adjusted_response: String,

    /// The user's edited version of the adjusted response
    pub user_edit: String,

    /// Preferences learned from this round's edit
    pub learned: PreferenceEntry,

    /// Follow-up questions and justifications (empty in direct mode)
    pub follow_up_qa: Vec<JustificationPair>,
}

/// The two preference learning strategies
///
/// A closed set: the loop is configured with exactly one of these and the
/// choice is recorded in the session log so offline tooling can group runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningMode {
    /// Learn directly from the diff between generated and edited text
    Direct,

    /// Additionally ask the user to justify their most significant changes
    Justified,
}

impl LearningMode {
    /// Stable identifier used in log filenames and the log header
    pub fn name(&self) -> &'static str {
        match self {
            LearningMode::Direct => "direct",
            LearningMode::Justified => "justified",
        }
    }

    /// Human-readable description recorded in the session log
    pub fn description(&self) -> &'static str {
        match self {
            LearningMode::Direct => {
                "Direct mode: preference learning from response edits without user justification"
            }
            LearningMode::Justified => {
                "Justified mode: interactive preference learning with user justification for changes"
            }
        }
    }
}

impl std::fmt::Display for LearningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_rule_canonical_form() {
        let rule = PreferenceRule::new("medical history", "never disclose").unwrap();
        assert_eq!(rule.as_str(), "For medical history: never disclose");
        assert_eq!(rule.to_string(), "For medical history: never disclose");
    }

    #[test]
    fn test_preference_rule_trims_components() {
        let rule = PreferenceRule::new("  location  ", "  share city only ").unwrap();
        assert_eq!(rule.as_str(), "For location: share city only");
    }

    #[test]
    fn test_preference_rule_rejects_empty_components() {
        assert!(PreferenceRule::new("", "never disclose").is_none());
        assert!(PreferenceRule::new("medical history", "   ").is_none());
        assert!(PreferenceRule::new(" ", "").is_none());
    }

    #[test]
    fn test_preference_rule_serializes_as_plain_string() {
        let rule = PreferenceRule::new("email address", "redact").unwrap();
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, "\"For email address: redact\"");
    }

    #[test]
    fn test_learning_mode_identifiers() {
        assert_eq!(LearningMode::Direct.name(), "direct");
        assert_eq!(LearningMode::Justified.name(), "justified");
        assert!(LearningMode::Justified.description().contains("justification"));
    }

    #[test]
    fn test_interaction_record_roundtrip() {
        let record = InteractionRecord {
            round_number: 1,
            scenario_id: 3,
            timestamp: Utc::now(),
            user_instruction: "Reply to the email".to_string(),
            toolkits: vec!["Gmail".to_string()],
            base_prompt: "prompt".to_string(),
            preferences_used: vec!["For location: share city only".to_string()],
            complete_prompt: "full prompt".to_string(),
            baseline_response: "baseline".to_string(),
            adjusted_response: "adjusted".to_string(),
            user_edit: "edited".to_string(),
            learned: PreferenceEntry {
                scenario_id: 3,
                rules: vec![PreferenceRule::new("location", "share city only").unwrap()],
                raw_analysis: "analysis".to_string(),
            },
            follow_up_qa: vec![],
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: InteractionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
