//! Round orchestration
//!
//! Drives N strictly sequential rounds of generate → edit → learn →
//! record. One round completes fully before the next begins; no round is
//! ever partially recorded. The recorder is flushed exactly once when the
//! loop ends, whether it ran to completion, was aborted by the user, or a
//! round failed unrecovered.

use crate::error::Result;
use crate::learning::store::PreferenceStore;
use crate::learning::strategy::LearningStrategy;
use crate::scenario::sequencer::ScenarioSequencer;
use crate::services::llm::TextGenerator;
use crate::session::host::{EditOutcome, InteractionHost};
use crate::session::recorder::InteractionSink;
use crate::types::InteractionRecord;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// What a finished run looked like
#[derive(Debug)]
pub struct RunSummary {
    /// Rounds that completed fully (generated, edited, learned, recorded)
    pub rounds_completed: usize,

    /// Whether the user aborted before the round budget was spent
    pub aborted: bool,

    /// Where the session log was flushed
    pub log_path: PathBuf,

    /// Final state of the preference store
    pub store: PreferenceStore,
}

/// The elicitation loop over injected boundaries
pub struct ElicitationLoop {
    sequencer: ScenarioSequencer,
    generator: Arc<dyn TextGenerator>,
    strategy: Box<dyn LearningStrategy>,
    host: Arc<dyn InteractionHost>,
    recorder: Box<dyn InteractionSink>,
    store: PreferenceStore,
    rounds: usize,
}

impl ElicitationLoop {
    pub fn new(
        sequencer: ScenarioSequencer,
        generator: Arc<dyn TextGenerator>,
        strategy: Box<dyn LearningStrategy>,
        host: Arc<dyn InteractionHost>,
        recorder: Box<dyn InteractionSink>,
        rounds: usize,
    ) -> Self {
        Self {
            sequencer,
            generator,
            strategy,
            host,
            recorder,
            store: PreferenceStore::new(),
            rounds,
        }
    }

    /// Run the full round budget and flush the session log
    ///
    /// The flush happens even when a round fails or the user aborts, so
    /// completed rounds are never silently lost.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!(
            "Starting elicitation run: {} round(s), {} mode",
            self.rounds,
            self.strategy.mode()
        );

        let outcome = self.drive().await;
        let flushed = self.recorder.flush();

        let (rounds_completed, aborted) = outcome?;
        let log_path = flushed?;

        info!(
            "Run finished: {} round(s) completed{}",
            rounds_completed,
            if aborted { " (aborted)" } else { "" }
        );

        Ok(RunSummary {
            rounds_completed,
            aborted,
            log_path,
            store: self.store,
        })
    }

    /// Execute rounds until the budget is spent or the user aborts
    ///
    /// Returns (completed rounds, aborted).
    async fn drive(&mut self) -> Result<(usize, bool)> {
        for round in 1..=self.rounds {
            let (scenario_id, scenario) = self.sequencer.next()?;
            let base_prompt = self.sequencer.render_prompt(&scenario);

            // Baseline is never shown to the user; it exists for offline
            // comparison against the preference-adjusted response.
            let baseline = self.generator.generate(&base_prompt, None).await?;

            // Rules active before this round's extraction.
            let preferences = self.store.active_rules();
            debug!(
                "Round {}: {} preference rule(s) active",
                round,
                preferences.len()
            );
            let adjusted = self
                .generator
                .generate(&base_prompt, Some(&preferences))
                .await?;

            self.host.show_round(round, &scenario, &adjusted.response);

            let edited = match self.host.request_edit(&adjusted.response)? {
                EditOutcome::Edited(text) => text,
                EditOutcome::Aborted => {
                    info!("Run aborted by user during round {}", round);
                    return Ok((round - 1, true));
                }
            };

            let outcome = self
                .strategy
                .learn(&adjusted.response, &edited, &scenario, self.host.as_ref())
                .await?;

            let record = InteractionRecord {
                round_number: round,
                scenario_id,
                timestamp: Utc::now(),
                user_instruction: scenario.instruction.clone(),
                toolkits: scenario.toolkits.clone(),
                base_prompt,
                preferences_used: preferences,
                complete_prompt: adjusted.complete_prompt,
                baseline_response: baseline.response,
                adjusted_response: adjusted.response,
                user_edit: edited,
                learned: outcome.entry.clone(),
                follow_up_qa: outcome.justifications,
            };

            self.store.append(outcome.entry);
            self.recorder.append(record);

            debug!("Round {} recorded", round);
        }

        Ok((self.rounds, false))
    }
}
