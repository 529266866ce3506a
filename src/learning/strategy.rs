//! Preference learning strategies
//!
//! Two interchangeable ways to turn a (generated, edited) response pair
//! into a preference analysis:
//!
//! - **Direct**: one analysis call over the diff.
//! - **Justified**: first identify the most significant changes as
//!   questions, collect the user's justifications, then refine the direct
//!   analysis in light of them.
//!
//! Both parse the final analysis with the shared brace-pair extraction.

use crate::error::Result;
use crate::learning::extract::extract_rules;
use crate::services::llm::TextGenerator;
use crate::session::host::InteractionHost;
use crate::types::{JustificationPair, LearningMode, PreferenceEntry, ScenarioRecord};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Question cap per round, to bound the justification burden on the user
const MAX_QUESTIONS: usize = 2;

/// What a strategy produced for one round
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    /// The learned entry to append to the preference store
    pub entry: PreferenceEntry,

    /// Follow-up question/justification pairs, in question order
    /// (always empty for the direct strategy)
    pub justifications: Vec<JustificationPair>,
}

/// A preference learning strategy
///
/// The set is closed: exactly the direct and justified strategies exist,
/// selected once per run.
#[async_trait]
pub trait LearningStrategy: Send + Sync {
    /// Which mode this strategy implements, for the session log
    fn mode(&self) -> LearningMode;

    /// Convert one round's edit into a learned preference entry
    async fn learn(
        &self,
        generated: &str,
        edited: &str,
        scenario: &ScenarioRecord,
        host: &dyn InteractionHost,
    ) -> Result<StrategyOutcome>;
}

/// Direct strategy: a single analysis call over the response diff
pub struct DirectStrategy {
    generator: Arc<dyn TextGenerator>,
}

impl DirectStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn analysis_prompt(generated: &str, edited: &str, scenario: &ScenarioRecord) -> String {
        format!(
            r#"You are analyzing how a user edited a generated response to learn their privacy preferences.

The response was written for this instruction: {}

Original Response: {}

Edited Response: {}

Compare the two responses and explain what the edits reveal about the user's
privacy preferences: what information they removed, generalized, or added, and
what that implies about how such information should be disclosed in the future.

Finish your analysis with a section formatted EXACTLY as:
Summary of user privacy preferences:
- {{information type, disclosure directive}}
- {{information type, disclosure directive}}

One pair per line. If the edits reveal no privacy preference, omit the summary
section entirely."#,
            scenario.instruction, generated, edited
        )
    }

    /// Run the analysis call and parse its output
    ///
    /// Never fails: a generation error degrades to an entry with no rules
    /// and the error text retained for audit.
    async fn analyze(
        &self,
        generated: &str,
        edited: &str,
        scenario: &ScenarioRecord,
    ) -> PreferenceEntry {
        let prompt = Self::analysis_prompt(generated, edited, scenario);

        match self.generator.generate(&prompt, None).await {
            Ok(result) => {
                let rules = extract_rules(&result.response);
                debug!(
                    "Direct analysis of scenario {} produced {} rules",
                    scenario.id,
                    rules.len()
                );
                PreferenceEntry {
                    scenario_id: scenario.id,
                    rules,
                    raw_analysis: result.response,
                }
            }
            Err(e) => {
                warn!("Preference analysis failed, learning nothing this round: {}", e);
                PreferenceEntry {
                    scenario_id: scenario.id,
                    rules: Vec::new(),
                    raw_analysis: format!("analysis unavailable: {}", e),
                }
            }
        }
    }
}

#[async_trait]
impl LearningStrategy for DirectStrategy {
    fn mode(&self) -> LearningMode {
        LearningMode::Direct
    }

    async fn learn(
        &self,
        generated: &str,
        edited: &str,
        scenario: &ScenarioRecord,
        _host: &dyn InteractionHost,
    ) -> Result<StrategyOutcome> {
        let entry = self.analyze(generated, edited, scenario).await;
        Ok(StrategyOutcome {
            entry,
            justifications: Vec::new(),
        })
    }
}

/// Justified strategy: identify changes, collect justifications, refine
pub struct JustifiedStrategy {
    generator: Arc<dyn TextGenerator>,
    direct: DirectStrategy,
}

impl JustifiedStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        let direct = DirectStrategy::new(generator.clone());
        Self { generator, direct }
    }

    fn identify_prompt(generated: &str, edited: &str) -> String {
        format!(
            r#"Compare these two responses and identify specific privacy-related changes:
Original Response: {}
Edited Response: {}

List ONLY the most significant changes (maximum {}) as specific questions in this format:
- "Why did you remove [exact removed information]?"
- "Why did you make [exact information] more general?"
- "Why did you add [exact added information]?"

Only output the questions, one per line."#,
            generated, edited, MAX_QUESTIONS
        )
    }

    fn refine_prompt(
        generated: &str,
        edited: &str,
        justifications: &[JustificationPair],
        baseline_analysis: &str,
    ) -> String {
        let justification_text: Vec<String> = justifications
            .iter()
            .map(|pair| format!("Change: {}\nJustification: {}", pair.question, pair.justification))
            .collect();

        format!(
            r#"Original Response: {}
Edited Response: {}

User's Changes and Justifications:
{}

Initial Privacy Preference Analysis:
{}

Refine the privacy preference analysis by considering the user's
justifications. Focus on what the justifications tell us about their general
privacy preferences in this context.

Finish with a section formatted EXACTLY as:
The user's justifications suggest the following privacy preferences:
- {{information type, disclosure directive}}

One pair per line."#,
            generated,
            edited,
            justification_text.join("\n\n"),
            baseline_analysis
        )
    }

    /// Identify the most significant changes as follow-up questions
    ///
    /// Keeps lines that lead with `-` and contain a question mark, capped
    /// at two. A generation failure degrades to zero questions.
    async fn identify_changes(&self, generated: &str, edited: &str) -> Vec<String> {
        let prompt = Self::identify_prompt(generated, edited);

        let response = match self.generator.generate(&prompt, None).await {
            Ok(result) => result.response,
            Err(e) => {
                warn!("Change identification failed, skipping justifications: {}", e);
                return Vec::new();
            }
        };

        response
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('-') && line.contains('?'))
            .map(|line| line.trim_start_matches('-').trim().to_string())
            .take(MAX_QUESTIONS)
            .collect()
    }

    /// Collect a non-empty justification for each question, in order
    fn collect_justifications(
        &self,
        questions: Vec<String>,
        host: &dyn InteractionHost,
    ) -> Result<Vec<JustificationPair>> {
        let mut pairs = Vec::with_capacity(questions.len());

        for question in questions {
            let justification = loop {
                let answer = host.request_justification(&question)?;
                let answer = answer.trim();
                if !answer.is_empty() {
                    break answer.to_string();
                }
            };

            pairs.push(JustificationPair {
                question,
                justification,
            });
        }

        Ok(pairs)
    }
}

#[async_trait]
impl LearningStrategy for JustifiedStrategy {
    fn mode(&self) -> LearningMode {
        LearningMode::Justified
    }

    async fn learn(
        &self,
        generated: &str,
        edited: &str,
        scenario: &ScenarioRecord,
        host: &dyn InteractionHost,
    ) -> Result<StrategyOutcome> {
        let questions = self.identify_changes(generated, edited).await;
        if questions.is_empty() {
            info!("No significant changes identified; no justifications solicited");
        }

        let justifications = self.collect_justifications(questions, host)?;

        // Baseline analysis first, then refine it with the justifications.
        // Refinement is on the critical path: its failure propagates rather
        // than silently fabricating a preference.
        let baseline = self.direct.analyze(generated, edited, scenario).await;
        let prompt = Self::refine_prompt(generated, edited, &justifications, &baseline.raw_analysis);
        let refined = self.generator.generate(&prompt, None).await?;

        let rules = extract_rules(&refined.response);
        debug!(
            "Refined analysis of scenario {} produced {} rules",
            scenario.id,
            rules.len()
        );

        Ok(StrategyOutcome {
            entry: PreferenceEntry {
                scenario_id: scenario.id,
                rules,
                raw_analysis: refined.response,
            },
            justifications,
        })
    }
}
