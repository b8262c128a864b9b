//! Completion provider port
//!
//! Defines the interface for asking a language model to complete a prompt.

use async_trait::async_trait;
use cake_domain::{ModelConfig, ResponseFormat, Subject};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a single provider call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No API key configured for {0}")]
    MissingApiKey(String),

    #[error("Provider not supported: {0}")]
    Unsupported(String),
}

/// Everything a provider needs to answer one request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub subject: Subject,
    pub model: ModelConfig,
    pub system_prompt: String,
    /// Rendered, sanitized and truncated context
    pub context: String,
    pub response_format: ResponseFormat,
}

/// A successful model reply
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: Option<u32>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens_used: None,
        }
    }

    pub fn with_tokens_used(mut self, tokens: u32) -> Self {
        self.tokens_used = Some(tokens);
        self
    }
}

/// Port for language model completions
///
/// One call is one attempt: timeouts and retries are applied by the caller.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}
