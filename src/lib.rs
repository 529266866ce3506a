//! Aidos - Interactive Privacy-Preference Elicitation
//!
//! A small, stateful orchestration loop around a generative text service
//! that learns a user's privacy-disclosure preferences:
//! - Deterministic scenario sequencing over a fixed corpus
//! - Baseline and preference-adjusted response generation per round
//! - Preference rule extraction from the user's edits (direct or justified)
//! - Append-only preference accumulation fed back into later rounds
//! - Durable per-run interaction logs for offline evaluation
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (ScenarioRecord, PreferenceEntry, etc.)
//! - **Scenario**: Corpus access and sequential dispensing
//! - **Services**: Text generation boundary (Anthropic-backed)
//! - **Learning**: Rule extraction, preference store, learning strategies
//! - **Session**: Human boundary, durable recorder, orchestration loop
//!
//! # Example
//!
//! ```ignore
//! use aidos_core::{
//!     AnthropicGenerator, ConsoleHost, DirectStrategy, ElicitationLoop,
//!     JsonFileRecorder, JsonScenarioSource, LearningMode, ScenarioSequencer,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let source = Arc::new(JsonScenarioSource::load("scenarios.json")?);
//!     let generator = Arc::new(AnthropicGenerator::with_default()?);
//!
//!     let session = ElicitationLoop::new(
//!         ScenarioSequencer::new(source),
//!         generator.clone(),
//!         Box::new(DirectStrategy::new(generator)),
//!         Arc::new(ConsoleHost::new()),
//!         Box::new(JsonFileRecorder::new(LearningMode::Direct, "logs")),
//!         6,
//!     );
//!
//!     let summary = session.run().await?;
//!     println!("Log written to {}", summary.log_path.display());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod learning;
pub mod scenario;
pub mod services;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{AidosError, Result};
pub use learning::{
    extract_rules, DirectStrategy, JustifiedStrategy, LearningStrategy, PreferenceStore,
    StrategyOutcome,
};
pub use scenario::{JsonScenarioSource, ScenarioSequencer, ScenarioSource};
pub use services::{AnthropicGenerator, LlmConfig, TextGenerator};
pub use session::{
    ConsoleHost, EditOutcome, ElicitationLoop, InteractionHost, InteractionSink, JsonFileRecorder,
    RunSummary, SessionLog,
};
pub use types::{
    GenerationResult, InteractionRecord, JustificationPair, LearningMode, PreferenceEntry,
    PreferenceRule, ScenarioRecord,
};
