//! Text generation service boundary
//!
//! The elicitation loop treats generation as an opaque prompt-in, text-out
//! call: no latency or determinism guarantees, and the returned text may
//! fail to contain any of the markers the extractors look for. The
//! Anthropic-backed implementation injects the currently learned preference
//! rules ahead of the scenario prompt.

use crate::error::{AidosError, Result};
use crate::types::GenerationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::debug;

/// Configuration for the LLM service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Model to use (default: claude-3-5-haiku-20241022)
    pub model: String,

    /// Max tokens for responses
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Prompt-in, text-out generation boundary
///
/// `preferences`, when present, are canonical rule strings the generation
/// must honor; implementations fold them into the prompt and report the
/// exact prompt sent back in the result.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        preferences: Option<&[String]>,
    ) -> Result<GenerationResult>;
}

/// Compose the full prompt sent to the service
///
/// With no active preferences the scenario prompt passes through verbatim;
/// otherwise the learned rules are listed ahead of it so the response is
/// generated under them.
pub fn compose_prompt(prompt: &str, preferences: Option<&[String]>) -> String {
    match preferences {
        Some(rules) if !rules.is_empty() => {
            let listed: Vec<String> = rules.iter().map(|r| format!("- {}", r)).collect();
            format!(
                "When responding, respect the user's learned privacy preferences:\n{}\n\n{}",
                listed.join("\n"),
                prompt
            )
        }
        _ => prompt.to_string(),
    }
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    text: String,
}

/// Text generator backed by the Anthropic Messages API
pub struct AnthropicGenerator {
    config: LlmConfig,
    client: reqwest::Client,
}

impl AnthropicGenerator {
    /// Create a new generator with custom config
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AidosError::Config(config::ConfigError::Message(
                "ANTHROPIC_API_KEY not set".to_string(),
            )));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Create with default config
    pub fn with_default() -> Result<Self> {
        Self::new(LlmConfig::default())
    }

    /// Make an API call to Claude
    async fn call_api(&self, prompt: &str) -> Result<String> {
        debug!("Calling Anthropic API");

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(AidosError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AidosError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AidosError::LlmApi(format!("Failed to parse response: {}", e)))?;

        api_response
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| AidosError::LlmApi("Empty response from API".to_string()))
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(
        &self,
        prompt: &str,
        preferences: Option<&[String]>,
    ) -> Result<GenerationResult> {
        let complete_prompt = compose_prompt(prompt, preferences);
        let response = self.call_api(&complete_prompt).await?;

        Ok(GenerationResult {
            response,
            complete_prompt,
        })
    }
}
