//! Append-only accumulation of learned preferences
//!
//! Pure bookkeeping: no generation calls, no I/O. The store is an
//! explicitly owned value threaded through the elicitation loop, never
//! ambient state. Rules learned in earlier rounds are visible to all later
//! rounds; within a round they become visible only after extraction
//! completes.

use crate::types::PreferenceEntry;
use tracing::debug;

/// Ordered, append-only collection of per-round preference entries
#[derive(Debug, Default)]
pub struct PreferenceStore {
    entries: Vec<PreferenceEntry>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one round's learned entry
    pub fn append(&mut self, entry: PreferenceEntry) {
        debug!(
            "Storing {} rules learned from scenario {}",
            entry.rules.len(),
            entry.scenario_id
        );
        self.entries.push(entry);
    }

    /// All currently active rule strings, flattened in entry order
    ///
    /// No deduplication and no reordering: the prompt sees rules exactly in
    /// the order they were learned.
    pub fn active_rules(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.rules.iter().map(|rule| rule.as_str().to_string()))
            .collect()
    }

    /// Read-only view of all entries, earliest first
    pub fn entries(&self) -> &[PreferenceEntry] {
        &self.entries
    }

    /// Entry learned from the given scenario
    ///
    /// Scenario ids are expected to be unique per run; if the same scenario
    /// was run twice the first match wins.
    pub fn find(&self, scenario_id: u32) -> Option<&PreferenceEntry> {
        self.entries.iter().find(|e| e.scenario_id == scenario_id)
    }

    /// Number of completed rounds recorded so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries, for reuse between independent runs
    pub fn reset(&mut self) {
        self.entries.clear();
        debug!("Preference store reset");
    }
}
