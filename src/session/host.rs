//! Human interaction boundary
//!
//! Both edits and justifications are blocking console interactions in the
//! real tool, abstracted behind a synchronous trait so the loop and the
//! strategies can be exercised with scripted stubs instead of a live
//! terminal.

use crate::error::{AidosError, Result};
use crate::types::ScenarioRecord;
use std::io::{self, Write};
use tracing::debug;

/// Case-insensitive sentinel that aborts the entire run during an edit
pub const EXIT_SENTINEL: &str = "exit";

/// What came back from an edit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The user's edited version of the displayed response
    Edited(String),

    /// The user typed the exit sentinel; terminate the run
    Aborted,
}

/// Blocking boundary to the human participant
pub trait InteractionHost: Send + Sync {
    /// Show one round's scenario and its preference-adjusted response
    fn show_round(&self, round: usize, scenario: &ScenarioRecord, response: &str);

    /// Ask for a free-text edit of the displayed response
    fn request_edit(&self, displayed: &str) -> Result<EditOutcome>;

    /// Ask one follow-up question; a single prompt per call
    ///
    /// The caller re-asks until the answer is non-empty, so implementations
    /// may return whatever the user typed, including nothing.
    fn request_justification(&self, question: &str) -> Result<String>;
}

/// Console-backed host for interactive runs
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Result<String> {
        io::stdout().flush().map_err(AidosError::Io)?;

        let mut input = String::new();
        io::stdin().read_line(&mut input).map_err(AidosError::Io)?;
        Ok(input.trim().to_string())
    }
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionHost for ConsoleHost {
    fn show_round(&self, round: usize, scenario: &ScenarioRecord, response: &str) {
        println!("\n╔═══════════════════════════════════════════╗");
        println!("║ Round {:<36} ║", round);
        println!("╚═══════════════════════════════════════════╝\n");

        println!("User instruction: {}", scenario.instruction);
        println!("Available tools: {}", scenario.toolkits.join(", "));

        println!("\nGenerated response:");
        println!("{}", response);
        println!("\n───────────────────────────────────────────");
    }

    fn request_edit(&self, _displayed: &str) -> Result<EditOutcome> {
        println!("\nPlease enter your edited version of the response.");
        println!("(Type '{}' to end the session)", EXIT_SENTINEL);
        print!("Your edit: ");

        let input = self.read_line()?;

        if input.eq_ignore_ascii_case(EXIT_SENTINEL) {
            debug!("Exit sentinel received");
            return Ok(EditOutcome::Aborted);
        }

        Ok(EditOutcome::Edited(input))
    }

    fn request_justification(&self, question: &str) -> Result<String> {
        println!("\nQuestion: {}", question);
        print!("Your justification: ");

        self.read_line()
    }
}
