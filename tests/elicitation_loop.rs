//! End-to-end tests for the elicitation loop
//!
//! Drives the full round loop with scripted generator and host stubs and a
//! real file recorder: round budget, abort semantics, preference injection
//! ordering, justified-mode question cap, and flush-on-failure.

use aidos_core::{
    AidosError, DirectStrategy, EditOutcome, ElicitationLoop, GenerationResult, InteractionHost,
    JsonFileRecorder, JustifiedStrategy, LearningMode, Result, ScenarioRecord,
    ScenarioSequencer, ScenarioSource, SessionLog, TextGenerator,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Fixed in-memory corpus
struct FixedSource {
    records: Vec<ScenarioRecord>,
}

impl FixedSource {
    fn with(count: u32) -> Arc<Self> {
        let records = (1..=count)
            .map(|id| ScenarioRecord {
                id,
                instruction: format!("instruction {}", id),
                toolkits: vec!["Gmail".to_string()],
                trace: serde_json::Value::String(format!("trace {}", id)),
            })
            .collect();
        Arc::new(Self { records })
    }
}

impl ScenarioSource for FixedSource {
    fn count(&self) -> u32 {
        self.records.len() as u32
    }

    fn get(&self, number: u32) -> Option<ScenarioRecord> {
        self.records.iter().find(|r| r.id == number).cloned()
    }
}

/// Generator that replays a script and records every call it saw
struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<(String, Option<Vec<String>>)>>,
}

impl ScriptedGenerator {
    fn new(script: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, Option<Vec<String>>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        preferences: Option<&[String]>,
    ) -> Result<GenerationResult> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), preferences.map(|p| p.to_vec())));

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AidosError::LlmApi("script exhausted".to_string())));

        next.map(|response| GenerationResult {
            response,
            complete_prompt: prompt.to_string(),
        })
    }
}

/// Host that replays scripted edits and justifications
struct ScriptedHost {
    edits: Mutex<VecDeque<EditOutcome>>,
    justification_answers: Mutex<VecDeque<String>>,
    questions_asked: Mutex<Vec<String>>,
}

impl ScriptedHost {
    fn new(edits: Vec<EditOutcome>, justification_answers: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            edits: Mutex::new(edits.into_iter().collect()),
            justification_answers: Mutex::new(
                justification_answers.into_iter().map(String::from).collect(),
            ),
            questions_asked: Mutex::new(Vec::new()),
        })
    }

    fn questions_asked(&self) -> Vec<String> {
        self.questions_asked.lock().unwrap().clone()
    }
}

impl InteractionHost for ScriptedHost {
    fn show_round(&self, _round: usize, _scenario: &ScenarioRecord, _response: &str) {}

    fn request_edit(&self, _displayed: &str) -> Result<EditOutcome> {
        Ok(self
            .edits
            .lock()
            .unwrap()
            .pop_front()
            .expect("edit script exhausted"))
    }

    fn request_justification(&self, question: &str) -> Result<String> {
        self.questions_asked
            .lock()
            .unwrap()
            .push(question.to_string());
        Ok(self
            .justification_answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "because".to_string()))
    }
}

fn read_log(log_dir: &Path) -> SessionLog {
    let entry = std::fs::read_dir(log_dir)
        .unwrap()
        .next()
        .expect("no log file written")
        .unwrap();
    serde_json::from_str(&std::fs::read_to_string(entry.path()).unwrap()).unwrap()
}

fn analysis_with(rule: &str) -> String {
    format!("Summary of user privacy preferences:\n{{{}}}", rule)
}

#[tokio::test]
async fn round_cap_runs_exactly_n_rounds() {
    // 5 scenarios available, budget of 3: exactly 3 rounds, then stop.
    let generator = ScriptedGenerator::new(
        (0..9).map(|i| Ok(format!("response {}", i))).collect(),
    );
    let host = ScriptedHost::new(
        vec![
            EditOutcome::Edited("edit 1".to_string()),
            EditOutcome::Edited("edit 2".to_string()),
            EditOutcome::Edited("edit 3".to_string()),
        ],
        vec![],
    );
    let dir = TempDir::new().unwrap();

    let session = ElicitationLoop::new(
        ScenarioSequencer::new(FixedSource::with(5)),
        generator.clone(),
        Box::new(DirectStrategy::new(generator.clone())),
        host,
        Box::new(JsonFileRecorder::new(LearningMode::Direct, dir.path())),
        3,
    );

    let summary = session.run().await.unwrap();

    assert_eq!(summary.rounds_completed, 3);
    assert!(!summary.aborted);
    assert_eq!(summary.store.len(), 3);

    // Three generation calls per direct round: baseline, adjusted, analysis.
    assert_eq!(generator.calls().len(), 9);

    let log = read_log(dir.path());
    assert_eq!(log.total_rounds, 3);
    let scenario_ids: Vec<u32> = log.interactions.iter().map(|r| r.scenario_id).collect();
    assert_eq!(scenario_ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn abort_mid_run_preserves_prior_rounds() {
    // Exit sentinel on round 2 of 5: exactly one round survives.
    let generator = ScriptedGenerator::new(vec![
        Ok("baseline 1".to_string()),
        Ok("adjusted 1".to_string()),
        Ok(analysis_with("location, share city only")),
        Ok("baseline 2".to_string()),
        Ok("adjusted 2".to_string()),
    ]);
    let host = ScriptedHost::new(
        vec![
            EditOutcome::Edited("edit 1".to_string()),
            EditOutcome::Aborted,
        ],
        vec![],
    );
    let dir = TempDir::new().unwrap();

    let session = ElicitationLoop::new(
        ScenarioSequencer::new(FixedSource::with(5)),
        generator.clone(),
        Box::new(DirectStrategy::new(generator.clone())),
        host,
        Box::new(JsonFileRecorder::new(LearningMode::Direct, dir.path())),
        5,
    );

    let summary = session.run().await.unwrap();

    assert_eq!(summary.rounds_completed, 1);
    assert!(summary.aborted);
    assert_eq!(summary.store.len(), 1);

    let log = read_log(dir.path());
    assert_eq!(log.total_rounds, 1);
    assert_eq!(log.interactions[0].scenario_id, 1);
}

#[tokio::test]
async fn rules_learned_earlier_reach_later_adjusted_generations() {
    let generator = ScriptedGenerator::new(vec![
        Ok("baseline 1".to_string()),
        Ok("adjusted 1".to_string()),
        Ok(analysis_with("location, share city only")),
        Ok("baseline 2".to_string()),
        Ok("adjusted 2".to_string()),
        Ok(analysis_with("salary, never disclose")),
    ]);
    let host = ScriptedHost::new(
        vec![
            EditOutcome::Edited("edit 1".to_string()),
            EditOutcome::Edited("edit 2".to_string()),
        ],
        vec![],
    );
    let dir = TempDir::new().unwrap();

    let session = ElicitationLoop::new(
        ScenarioSequencer::new(FixedSource::with(2)),
        generator.clone(),
        Box::new(DirectStrategy::new(generator.clone())),
        host,
        Box::new(JsonFileRecorder::new(LearningMode::Direct, dir.path())),
        2,
    );

    let summary = session.run().await.unwrap();
    let calls = generator.calls();

    // Round 1: baseline has no preferences, adjusted sees the (empty) set.
    assert_eq!(calls[0].1, None);
    assert_eq!(calls[1].1, Some(vec![]));

    // Round 2's adjusted call sees exactly what round 1 learned; the
    // analysis calls themselves never carry preferences.
    assert_eq!(calls[3].1, None);
    assert_eq!(
        calls[4].1,
        Some(vec!["For location: share city only".to_string()])
    );
    assert_eq!(calls[5].1, None);

    // After both rounds the store holds both rules, in learning order.
    assert_eq!(
        summary.store.active_rules(),
        vec![
            "For location: share city only".to_string(),
            "For salary: never disclose".to_string(),
        ]
    );

    let log = read_log(dir.path());
    assert!(log.interactions[0].preferences_used.is_empty());
    assert_eq!(
        log.interactions[1].preferences_used,
        vec!["For location: share city only".to_string()]
    );
}

#[tokio::test]
async fn justified_mode_caps_questions_and_records_pairs() {
    let identify_response = "- \"Why did you remove the hotel name?\"\n\
        - \"Why did you remove the room number?\"\n\
        - \"Why did you make the dates more general?\"\n\
        - \"Why did you remove the booking reference?\"\n\
        - \"Why did you add a greeting?\"";

    let generator = ScriptedGenerator::new(vec![
        Ok("baseline 1".to_string()),
        Ok("adjusted 1".to_string()),
        Ok(identify_response.to_string()),
        Ok("baseline analysis".to_string()),
        Ok(analysis_with("hotel details, never disclose")),
    ]);
    let host = ScriptedHost::new(
        vec![EditOutcome::Edited("edit 1".to_string())],
        vec!["too identifying", "not needed"],
    );
    let dir = TempDir::new().unwrap();

    let session = ElicitationLoop::new(
        ScenarioSequencer::new(FixedSource::with(1)),
        generator.clone(),
        Box::new(JustifiedStrategy::new(generator.clone())),
        host.clone(),
        Box::new(JsonFileRecorder::new(LearningMode::Justified, dir.path())),
        1,
    );

    let summary = session.run().await.unwrap();

    // Of five candidate questions exactly two are retained, in order.
    let asked = host.questions_asked();
    assert_eq!(asked.len(), 2);
    assert!(asked[0].contains("hotel name"));
    assert!(asked[1].contains("room number"));

    assert_eq!(summary.store.len(), 1);
    assert_eq!(
        summary.store.active_rules(),
        vec!["For hotel details: never disclose".to_string()]
    );

    let log = read_log(dir.path());
    assert_eq!(log.mode, "justified");
    assert_eq!(log.interactions[0].follow_up_qa.len(), 2);
    assert_eq!(
        log.interactions[0].follow_up_qa[0].justification,
        "too identifying"
    );
}

#[tokio::test]
async fn failed_round_still_flushes_completed_rounds() {
    // Round 2's baseline call dies; round 1 must survive in the log.
    let generator = ScriptedGenerator::new(vec![
        Ok("baseline 1".to_string()),
        Ok("adjusted 1".to_string()),
        Ok(analysis_with("location, share city only")),
        Err(AidosError::LlmApi("service down".to_string())),
    ]);
    let host = ScriptedHost::new(
        vec![
            EditOutcome::Edited("edit 1".to_string()),
            EditOutcome::Edited("edit 2".to_string()),
        ],
        vec![],
    );
    let dir = TempDir::new().unwrap();

    let session = ElicitationLoop::new(
        ScenarioSequencer::new(FixedSource::with(3)),
        generator.clone(),
        Box::new(DirectStrategy::new(generator.clone())),
        host,
        Box::new(JsonFileRecorder::new(LearningMode::Direct, dir.path())),
        3,
    );

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, AidosError::LlmApi(_)));

    let log = read_log(dir.path());
    assert_eq!(log.total_rounds, 1);
    assert_eq!(log.interactions[0].scenario_id, 1);
}

#[tokio::test]
async fn no_op_edit_learns_nothing() {
    // A well-behaved backend reports no changes; no rule is fabricated.
    let generator = ScriptedGenerator::new(vec![
        Ok("the response".to_string()),
        Ok("the response".to_string()),
        Ok("The two responses are identical; no preference changes observed.".to_string()),
    ]);
    let host = ScriptedHost::new(
        vec![EditOutcome::Edited("the response".to_string())],
        vec![],
    );
    let dir = TempDir::new().unwrap();

    let session = ElicitationLoop::new(
        ScenarioSequencer::new(FixedSource::with(1)),
        generator.clone(),
        Box::new(DirectStrategy::new(generator.clone())),
        host,
        Box::new(JsonFileRecorder::new(LearningMode::Direct, dir.path())),
        1,
    );

    let summary = session.run().await.unwrap();

    assert_eq!(summary.store.len(), 1);
    assert!(summary.store.active_rules().is_empty());
    assert!(summary.store.entries()[0].rules.is_empty());
}
