//! LLM Provider trait definition
//!
//! The generation capability used by every analysis, drafting and finalizing
//! step. A provider takes system instructions plus ordered user turns and
//! returns a single text completion.

use async_trait::async_trait;

use super::config::{LLMConfig, TokenUsage};
use super::message::Message;
use crate::error::DeepSearchError;

/// LLM completion response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// The assistant's response message
    pub message: Message,
    /// Token usage statistics (if available from provider)
    pub usage: Option<TokenUsage>,
}

impl LLMResponse {
    pub fn new(message: Message) -> Self {
        Self { message, usage: None }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Response text
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Core LLM Provider trait
///
/// Provides a provider-agnostic interface for text completion. No streaming
/// and no structured output mode: callers read the returned text.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use deepsearch::llm::{LLMProvider, LLMResponse, LLMConfig, Message};
///
/// struct Canned;
///
/// #[async_trait]
/// impl LLMProvider for Canned {
///     async fn complete(
///         &self,
///         _messages: &[Message],
///         _config: Option<&LLMConfig>,
///     ) -> Result<LLMResponse, DeepSearchError> {
///         Ok(LLMResponse::new(Message::assistant("Looks complete.")))
///     }
///
///     fn name(&self) -> &str { "canned" }
/// }
/// ```
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for the given conversation
    async fn complete(
        &self,
        messages: &[Message],
        config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, DeepSearchError>;

    /// Provider name for logging/debugging
    fn name(&self) -> &str;
}
