//! Anthropic messages API adapter

use super::http::{HttpRequest, HttpResponse, HttpTransport};
use super::{ProviderAdapter, endpoint, error_message};
use async_trait::async_trait;
use cake_application::{Completion, CompletionRequest, ProviderError};
use cake_domain::{ProviderKind, ResponseFormat};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Appended to the system prompt; the messages API has no JSON mode
const JSON_INSTRUCTION: &str = "Respond with a single JSON object and nothing else.";

pub struct AnthropicAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl AnthropicAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let http = build_request(request)?;
        debug!(
            subject = %request.subject,
            model = %request.model.model_name,
            url = %http.url,
            "Sending messages request"
        );
        let response = self.transport.post_json(http).await?;
        parse_response(&response)
    }
}

pub fn build_request(request: &CompletionRequest) -> Result<HttpRequest, ProviderError> {
    let model = &request.model;
    let key = model
        .api_key
        .as_ref()
        .ok_or_else(|| ProviderError::MissingApiKey(ProviderKind::Anthropic.as_str().to_string()))?;
    let base = model.api_base.as_deref().unwrap_or(ANTHROPIC_API_BASE);

    let system = match request.response_format {
        ResponseFormat::Json => format!("{}\n\n{JSON_INSTRUCTION}", request.system_prompt),
        ResponseFormat::Text => request.system_prompt.clone(),
    };

    Ok(HttpRequest {
        url: endpoint(base, "v1/messages"),
        headers: vec![
            ("x-api-key".to_string(), key.expose().to_string()),
            ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ],
        body: json!({
            "model": model.model_name,
            "system": system,
            "messages": [{ "role": "user", "content": request.context }],
            "max_tokens": model.max_tokens,
            "temperature": model.temperature,
        }),
    })
}

pub fn parse_response(response: &HttpResponse) -> Result<Completion, ProviderError> {
    if response.status >= 400 {
        return Err(ProviderError::Api {
            status: response.status,
            message: error_message(&response.body, "unknown API error"),
        });
    }

    let text: String = response.body["content"]
        .as_array()
        .ok_or_else(|| ProviderError::InvalidResponse("missing content array".to_string()))?
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();

    let completion = Completion::new(text.trim());
    Ok(match total_tokens(&response.body["usage"]) {
        Some(tokens) => completion.with_tokens_used(tokens),
        None => completion,
    })
}

fn total_tokens(usage: &Value) -> Option<u32> {
    let input = usage["input_tokens"].as_u64()?;
    let output = usage["output_tokens"].as_u64()?;
    u32::try_from(input + output).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::testing::FakeTransport;
    use cake_domain::{ApiKey, ModelConfig, Subject};

    fn request(format: ResponseFormat) -> CompletionRequest {
        CompletionRequest {
            subject: Subject::Celebration,
            model: ModelConfig::new(ProviderKind::Anthropic, "claude-3-haiku")
                .with_api_key(ApiKey::new("ant-key"))
                .with_max_tokens(100),
            system_prompt: "You lead celebrations.".to_string(),
            context: "Celebrating: streak - 7 days".to_string(),
            response_format: format,
        }
    }

    #[test]
    fn test_build_request() {
        let http = build_request(&request(ResponseFormat::Text)).unwrap();
        assert_eq!(http.url, "https://api.anthropic.com/v1/messages");
        assert!(http.headers.contains(&("x-api-key".to_string(), "ant-key".to_string())));
        assert!(http
            .headers
            .contains(&("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string())));
        assert_eq!(http.body["system"], "You lead celebrations.");
        assert_eq!(http.body["messages"][0]["role"], "user");
        assert_eq!(http.body["messages"][0]["content"], "Celebrating: streak - 7 days");
        assert_eq!(http.body["max_tokens"], 100);
    }

    #[test]
    fn test_json_format_extends_system_prompt() {
        let http = build_request(&request(ResponseFormat::Json)).unwrap();
        let system = http.body["system"].as_str().unwrap();
        assert!(system.starts_with("You lead celebrations."));
        assert!(system.ends_with(JSON_INSTRUCTION));
    }

    #[test]
    fn test_requires_key() {
        let mut req = request(ResponseFormat::Text);
        req.model.api_key = None;
        assert_eq!(
            build_request(&req).unwrap_err(),
            ProviderError::MissingApiKey("anthropic".to_string())
        );
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let response = HttpResponse {
            status: 200,
            body: json!({
                "content": [
                    { "type": "text", "text": "🎉 Party " },
                    { "type": "text", "text": "time!" }
                ],
                "usage": { "input_tokens": 20, "output_tokens": 5 }
            }),
        };
        let completion = parse_response(&response).unwrap();
        assert_eq!(completion.text, "🎉 Party time!");
        assert_eq!(completion.tokens_used, Some(25));
    }

    #[test]
    fn test_parse_response_error() {
        let response = HttpResponse {
            status: 529,
            body: json!({ "type": "error", "error": { "type": "overloaded_error", "message": "Overloaded" } }),
        };
        assert_eq!(
            parse_response(&response).unwrap_err(),
            ProviderError::Api {
                status: 529,
                message: "Overloaded".to_string()
            }
        );
    }

    #[test]
    fn test_parse_response_missing_content() {
        let response = HttpResponse {
            status: 200,
            body: json!({ "id": "msg_1" }),
        };
        assert!(matches!(
            parse_response(&response),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = FakeTransport::failing(ProviderError::Connection("refused".to_string()));
        let adapter = AnthropicAdapter::new(transport);
        assert_eq!(
            adapter.complete(&request(ResponseFormat::Text)).await.unwrap_err(),
            ProviderError::Connection("refused".to_string())
        );
    }
}
