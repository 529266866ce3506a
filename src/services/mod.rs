//! Services layer for the Aidos elicitation system
//!
//! Provides the text generation boundary and its Anthropic-backed
//! implementation.

pub mod llm;

pub use llm::{AnthropicGenerator, LlmConfig, TextGenerator};
