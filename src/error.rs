//! Error types for the Aidos elicitation system
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use thiserror::Error;

/// Main error type for Aidos operations
#[derive(Error, Debug)]
pub enum AidosError {
    /// Scenario sequencer has no more scenarios to dispense
    #[error("Scenarios exhausted: {0}")]
    ScenariosExhausted(String),

    /// LLM API request failed or returned unusable data
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// Scenario corpus is malformed or missing required fields
    #[error("Invalid scenario data: {0}")]
    InvalidScenario(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Aidos operations
pub type Result<T> = std::result::Result<T, AidosError>;

/// Convert anyhow::Error to AidosError
impl From<anyhow::Error> for AidosError {
    fn from(err: anyhow::Error) -> Self {
        AidosError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AidosError::ScenariosExhausted("requested round 7 of 6".to_string());
        assert_eq!(err.to_string(), "Scenarios exhausted: requested round 7 of 6");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: AidosError = anyhow::anyhow!("something broke").into();
        assert!(matches!(err, AidosError::Other(_)));
        assert_eq!(err.to_string(), "something broke");
    }
}
