//! OpenAI chat completions adapter
//!
//! Also serves `local` models: any OpenAI-compatible server at `api_base`,
//! where the key is optional.

use super::http::{HttpRequest, HttpResponse, HttpTransport};
use super::{ProviderAdapter, endpoint, error_message};
use async_trait::async_trait;
use cake_application::{Completion, CompletionRequest, ProviderError};
use cake_domain::{ProviderKind, ResponseFormat};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const LOCAL_API_BASE: &str = "http://localhost:11434/v1";

pub struct OpenAiAdapter {
    kind: ProviderKind,
    transport: Arc<dyn HttpTransport>,
}

impl OpenAiAdapter {
    pub fn openai(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            transport,
        }
    }

    pub fn local(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            kind: ProviderKind::Local,
            transport,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let http = build_request(self.kind, request)?;
        debug!(
            subject = %request.subject,
            model = %request.model.model_name,
            url = %http.url,
            "Sending chat completion request"
        );
        let response = self.transport.post_json(http).await?;
        parse_response(&response)
    }
}

pub fn build_request(kind: ProviderKind, request: &CompletionRequest) -> Result<HttpRequest, ProviderError> {
    let model = &request.model;
    let default_base = match kind {
        ProviderKind::Local => LOCAL_API_BASE,
        _ => OPENAI_API_BASE,
    };
    let base = model.api_base.as_deref().unwrap_or(default_base);

    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    match (&model.api_key, kind) {
        (Some(key), _) => headers.push(("Authorization".to_string(), format!("Bearer {}", key.expose()))),
        (None, ProviderKind::Local) => {}
        (None, _) => return Err(ProviderError::MissingApiKey(kind.as_str().to_string())),
    }

    let mut body = json!({
        "model": model.model_name,
        "messages": [
            { "role": "system", "content": request.system_prompt },
            { "role": "user", "content": request.context },
        ],
        "max_tokens": model.max_tokens,
        "temperature": model.temperature,
    });
    if request.response_format == ResponseFormat::Json {
        body["response_format"] = json!({ "type": "json_object" });
    }

    Ok(HttpRequest {
        url: endpoint(base, "chat/completions"),
        headers,
        body,
    })
}

pub fn parse_response(response: &HttpResponse) -> Result<Completion, ProviderError> {
    if response.status >= 400 {
        return Err(ProviderError::Api {
            status: response.status,
            message: error_message(&response.body, "unknown API error"),
        });
    }

    let text = response.body["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse("missing choices[0].message.content".to_string()))?;

    let completion = Completion::new(text.trim());
    Ok(match total_tokens(&response.body["usage"]) {
        Some(tokens) => completion.with_tokens_used(tokens),
        None => completion,
    })
}

fn total_tokens(usage: &Value) -> Option<u32> {
    let total = usage["total_tokens"].as_u64().or_else(|| {
        let prompt = usage["prompt_tokens"].as_u64()?;
        let completion = usage["completion_tokens"].as_u64()?;
        Some(prompt + completion)
    })?;
    u32::try_from(total).ok()
}
