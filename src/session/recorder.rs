//! Durable recording of elicitation rounds
//!
//! Every completed round is appended as a full interaction record; a single
//! flush at the end of the run writes one JSON document per run. The
//! serialized shape is the interchange format consumed by the offline
//! evaluation tooling (edit-distance and information-alignment scoring) and
//! must stay stable.

use crate::error::Result;
use crate::types::{InteractionRecord, LearningMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Append-only sink for completed rounds
pub trait InteractionSink: Send {
    /// Record one completed round
    fn append(&mut self, record: InteractionRecord);

    /// Write everything recorded so far to durable storage
    ///
    /// Returns the location of the written log. Called exactly once per
    /// run, after the last round or on abort.
    fn flush(&mut self) -> Result<PathBuf>;
}

/// On-disk shape of one run's session log
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionLog {
    /// Unique identifier for this run
    pub run_id: Uuid,

    /// Mode identifier ("direct" or "justified")
    pub mode: String,

    /// Human-readable mode description
    pub mode_description: String,

    /// When the log was flushed
    pub timestamp: DateTime<Utc>,

    /// Number of completed rounds
    pub total_rounds: usize,

    /// All completed rounds, in round order
    pub interactions: Vec<InteractionRecord>,
}

/// Recorder that flushes one JSON log file per run
pub struct JsonFileRecorder {
    mode: LearningMode,
    log_dir: PathBuf,
    run_id: Uuid,
    interactions: Vec<InteractionRecord>,
}

impl JsonFileRecorder {
    pub fn new(mode: LearningMode, log_dir: impl AsRef<Path>) -> Self {
        Self {
            mode,
            log_dir: log_dir.as_ref().to_path_buf(),
            run_id: Uuid::new_v4(),
            interactions: Vec::new(),
        }
    }

    /// Rounds recorded so far
    pub fn interactions(&self) -> &[InteractionRecord] {
        &self.interactions
    }
}

impl InteractionSink for JsonFileRecorder {
    fn append(&mut self, record: InteractionRecord) {
        self.interactions.push(record);
    }

    fn flush(&mut self) -> Result<PathBuf> {
        fs::create_dir_all(&self.log_dir)?;

        let now = Utc::now();
        let filename = format!(
            "interaction_log_{}_{}.json",
            self.mode.name(),
            now.format("%Y%m%d_%H%M%S")
        );
        let path = self.log_dir.join(filename);

        let log = SessionLog {
            run_id: self.run_id,
            mode: self.mode.name().to_string(),
            mode_description: self.mode.description().to_string(),
            timestamp: now,
            total_rounds: self.interactions.len(),
            interactions: std::mem::take(&mut self.interactions),
        };

        fs::write(&path, serde_json::to_string_pretty(&log)?)?;
        info!(
            "Flushed {} interaction(s) to {}",
            log.total_rounds,
            path.display()
        );
        Ok(path)
    }
}
