//! Completion provider adapters
//!
//! Each adapter speaks one wire protocol. [`RoutingProvider`] picks the
//! adapter for a request from its model's provider tag.

pub mod anthropic;
pub mod http;
pub mod openai;
pub mod routing;

pub use anthropic::AnthropicAdapter;
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use openai::OpenAiAdapter;
pub use routing::RoutingProvider;

use async_trait::async_trait;
use cake_application::{Completion, CompletionRequest, ProviderError};
use cake_domain::ProviderKind;

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Join a configured base URL and an endpoint path without doubling slashes
fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Pull a human-readable message out of an error body
fn error_message(body: &serde_json::Value, fallback: &str) -> String {
    body["error"]["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .or_else(|| body["message"].as_str())
        .unwrap_or(fallback)
        .to_string()
}
