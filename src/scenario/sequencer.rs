//! Deterministic scenario sequencing
//!
//! Walks the corpus in fixed order so that independent runs over the same
//! source dispense identical (id, record) pairs and stay directly
//! comparable. No randomization.

use crate::error::{AidosError, Result};
use crate::scenario::source::ScenarioSource;
use crate::types::ScenarioRecord;
use std::sync::Arc;
use tracing::debug;

/// Sequential dispenser over a scenario source
pub struct ScenarioSequencer {
    source: Arc<dyn ScenarioSource>,

    /// Next scenario number to dispense, starting at 1
    cursor: u32,

    /// Ids dispensed so far, for introspection only
    used: Vec<u32>,
}

impl ScenarioSequencer {
    pub fn new(source: Arc<dyn ScenarioSource>) -> Self {
        debug!("Sequencer initialized with {} scenarios", source.count());
        Self {
            source,
            cursor: 1,
            used: Vec::new(),
        }
    }

    /// Dispense the next scenario and advance the cursor
    ///
    /// Fails once the cursor passes the corpus count, or when the source
    /// cannot produce the record at the cursor (treated the same way).
    pub fn next(&mut self) -> Result<(u32, ScenarioRecord)> {
        let total = self.source.count();
        if self.cursor > total {
            return Err(AidosError::ScenariosExhausted(format!(
                "requested scenario {} of {}",
                self.cursor, total
            )));
        }

        let record = self.source.get(self.cursor).ok_or_else(|| {
            AidosError::ScenariosExhausted(format!(
                "scenario {} not found in corpus of {}",
                self.cursor, total
            ))
        })?;

        let number = self.cursor;
        self.used.push(number);
        self.cursor += 1;

        debug!(
            "Dispensed scenario {} ({} remaining)",
            number,
            self.remaining()
        );
        Ok((number, record))
    }

    /// Number of scenarios not yet dispensed
    pub fn remaining(&self) -> u32 {
        self.source.count().saturating_sub(self.used.len() as u32)
    }

    /// Ids dispensed so far, in dispense order
    pub fn used(&self) -> &[u32] {
        &self.used
    }

    /// Restore the cursor to the beginning and clear the dispense history
    pub fn reset(&mut self) {
        self.cursor = 1;
        self.used.clear();
        debug!("Sequencer reset to start of corpus");
    }

    /// Render a scenario into a single generation prompt
    ///
    /// Pure function of the record: same record, same prompt.
    pub fn render_prompt(&self, record: &ScenarioRecord) -> String {
        let trace = match &record.trace {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        format!(
            r#"Please provide a response based on the user instruction: {}
The tools you can use: {}
Here's the possible related information you observe from the user's database: {}
Response:"#,
            record.instruction,
            record.toolkits.join(", "),
            trace
        )
    }
}
