//! Scenario source boundary
//!
//! The elicitation loop only needs sequential access by count: how many
//! scenarios exist, and fetch-by-number. A source failing to find a record
//! is treated as "no more scenarios" by the sequencer, not as corruption.

use crate::error::{AidosError, Result};
use crate::types::ScenarioRecord;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Read-only access to an ordered scenario corpus
pub trait ScenarioSource: Send + Sync {
    /// Total number of scenarios in the corpus
    fn count(&self) -> u32;

    /// Fetch the scenario with the given stable number, if present
    fn get(&self, number: u32) -> Option<ScenarioRecord>;
}

/// Raw corpus shape as stored on disk
///
/// Each object carries its stable `main_number` and a `trajectory` with the
/// fields the loop cares about; additional trajectory fields are ignored.
#[derive(Debug, Deserialize)]
struct RawScenario {
    main_number: u32,
    trajectory: RawTrajectory,
}

#[derive(Debug, Deserialize)]
struct RawTrajectory {
    user_instruction: String,
    toolkits: Vec<String>,
    executable_trajectory: serde_json::Value,
}

/// Scenario source backed by a JSON corpus file
#[derive(Debug)]
pub struct JsonScenarioSource {
    scenarios: Vec<ScenarioRecord>,
}

impl JsonScenarioSource {
    /// Load a corpus from a JSON file of scenario objects
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading scenario corpus from {}", path.display());

        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a corpus from its JSON text
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: Vec<RawScenario> = serde_json::from_str(raw)?;

        let scenarios: Vec<ScenarioRecord> = parsed
            .into_iter()
            .map(|s| ScenarioRecord {
                id: s.main_number,
                instruction: s.trajectory.user_instruction,
                toolkits: s.trajectory.toolkits,
                trace: s.trajectory.executable_trajectory,
            })
            .collect();

        if scenarios.is_empty() {
            return Err(AidosError::InvalidScenario(
                "corpus contains no scenarios".to_string(),
            ));
        }

        info!("Loaded {} scenarios", scenarios.len());
        Ok(Self { scenarios })
    }

    /// All loaded scenarios, in corpus order
    pub fn scenarios(&self) -> &[ScenarioRecord] {
        &self.scenarios
    }
}

impl ScenarioSource for JsonScenarioSource {
    fn count(&self) -> u32 {
        self.scenarios.len() as u32
    }

    fn get(&self, number: u32) -> Option<ScenarioRecord> {
        self.scenarios.iter().find(|s| s.id == number).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"[
        {
            "main_number": 1,
            "trajectory": {
                "user_instruction": "Reply to Sarah's email about the reunion",
                "toolkits": ["Gmail", "Calendar"],
                "executable_trajectory": "Observed: user searched inbox for 'reunion'"
            }
        },
        {
            "main_number": 2,
            "trajectory": {
                "user_instruction": "Post an update about the weekend trip",
                "toolkits": ["Facebook"],
                "executable_trajectory": {"events": ["photo uploaded"]},
                "final_action": "ignored extra field"
            }
        }
    ]"#;

    #[test]
    fn test_load_corpus() {
        let source = JsonScenarioSource::from_json(CORPUS).unwrap();
        assert_eq!(source.count(), 2);

        let first = source.get(1).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.instruction, "Reply to Sarah's email about the reunion");
        assert_eq!(first.toolkits, vec!["Gmail", "Calendar"]);
    }

    #[test]
    fn test_extra_trajectory_fields_tolerated() {
        let source = JsonScenarioSource::from_json(CORPUS).unwrap();
        let second = source.get(2).unwrap();
        assert_eq!(second.toolkits, vec!["Facebook"]);
        assert!(second.trace.get("events").is_some());
    }

    #[test]
    fn test_missing_scenario_is_absent() {
        let source = JsonScenarioSource::from_json(CORPUS).unwrap();
        assert!(source.get(3).is_none());
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let err = JsonScenarioSource::from_json("[]").unwrap_err();
        assert!(matches!(err, AidosError::InvalidScenario(_)));
    }

    #[test]
    fn test_malformed_corpus_rejected() {
        let err = JsonScenarioSource::from_json("{\"not\": \"an array\"}").unwrap_err();
        assert!(matches!(err, AidosError::Serialization(_)));
    }
}
