//! Minimal JSON-over-HTTP transport shared by the adapters

use async_trait::async_trait;
use cake_application::ProviderError;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    /// Header pairs; may contain credentials, so never log them
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError>;
}

/// Production transport using reqwest
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<dyn HttpTransport> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        let mut builder = self.client.post(&request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("HTTP request failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Connection(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            body: parse_body(status, &text)?,
        })
    }
}

/// Error pages are often not JSON; keep their text as the message
fn parse_body(status: u16, text: &str) -> Result<Value, ProviderError> {
    match serde_json::from_str(text) {
        Ok(body) => Ok(body),
        Err(_) if status >= 400 => Ok(serde_json::json!({ "error": { "message": text.trim() } })),
        Err(e) => Err(ProviderError::InvalidResponse(format!(
            "response body is not JSON: {e}"
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_json() {
        assert_eq!(parse_body(200, r#"{"ok": true}"#).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn test_parse_body_html_error_page() {
        let body = parse_body(502, "<html>Bad Gateway</html>\n").unwrap();
        assert_eq!(body["error"]["message"], "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_parse_body_garbage_success_is_invalid() {
        assert!(matches!(
            parse_body(200, "not json"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
