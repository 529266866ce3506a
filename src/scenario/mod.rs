//! Scenario corpus access and sequential dispensing
//!
//! Provides the scenario source boundary (corpus loading) and the
//! deterministic sequencer that walks it in fixed order.

pub mod sequencer;
pub mod source;

pub use sequencer::ScenarioSequencer;
pub use source::{JsonScenarioSource, ScenarioSource};
