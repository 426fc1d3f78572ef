//! LLM provider trait.
//!
//! Defines the `LlmProvider` trait that the language-model fallback talks to.
//! The `openai` module provides an OpenAI-compatible implementation
//! that covers Groq (the default) and most other hosted providers.

pub mod openai;
pub mod types;

use async_trait::async_trait;
use types::{ChatMessage, LlmResponse};

/// Trait for LLM providers.
///
/// Any backend that can answer a chat completion must implement this trait.
/// Failures are reported through `anyhow::Result`; callers decide whether
/// they are fatal.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` - System context followed by the user message
    /// * `model` - Model identifier override (None = use default)
    /// * `max_tokens` - Maximum response tokens
    /// * `temperature` - Sampling temperature
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
        max_tokens: u32,
        temperature: f32,
    ) -> anyhow::Result<LlmResponse>;

    /// Get the default model identifier.
    fn default_model(&self) -> &str;
}
