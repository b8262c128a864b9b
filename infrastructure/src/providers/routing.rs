use super::{AnthropicAdapter, HttpTransport, OpenAiAdapter, ProviderAdapter, ReqwestTransport};
use async_trait::async_trait;
use cake_application::{Completion, CompletionProvider, CompletionRequest, ProviderError};
use cake_domain::ProviderKind;
use std::sync::Arc;

/// Dispatches each request to the adapter for its model's provider tag.
///
/// `fallback` is never routed: it is the static tier, served by the
/// orchestrator without a provider call.
pub struct RoutingProvider {
    providers: Vec<Arc<dyn ProviderAdapter>>,
}

impl RoutingProvider {
    pub fn new(providers: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { providers }
    }

    /// OpenAI, Anthropic and local adapters sharing one HTTP client
    pub fn with_http_adapters() -> Self {
        Self::with_transport(ReqwestTransport::shared())
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(vec![
            Arc::new(OpenAiAdapter::openai(transport.clone())),
            Arc::new(AnthropicAdapter::new(transport.clone())),
            Arc::new(OpenAiAdapter::local(transport)),
        ])
    }

    fn resolve_provider(&self, kind: ProviderKind) -> Result<&dyn ProviderAdapter, ProviderError> {
        if !kind.is_live() {
            return Err(ProviderError::Unsupported(format!(
                "'{kind}' models are served from the static pool"
            )));
        }
        self.providers
            .iter()
            .find(|p| p.kind() == kind)
            .map(|p| p.as_ref())
            .ok_or_else(|| ProviderError::Unsupported(format!("no adapter registered for '{kind}'")))
    }
}

#[async_trait]
impl CompletionProvider for RoutingProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.resolve_provider(request.model.provider)?
            .complete(request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::testing::FakeTransport;
    use cake_domain::{ApiKey, ModelConfig, ResponseFormat, Subject};
    use serde_json::json;

    // -- Mock ProviderAdapter --------------------------------------------------

    struct MockProvider {
        kind: ProviderKind,
    }

    impl MockProvider {
        fn new(kind: ProviderKind) -> Arc<dyn ProviderAdapter> {
            Arc::new(Self { kind })
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, ProviderError> {
            Ok(Completion::new(self.kind.as_str()))
        }
    }

    // -- Helpers ---------------------------------------------------------------

    fn request(provider: ProviderKind) -> CompletionRequest {
        CompletionRequest {
            subject: Subject::Motivation,
            model: ModelConfig::new(provider, "some-model").with_api_key(ApiKey::new("k")),
            system_prompt: "sys".to_string(),
            context: "ctx".to_string(),
            response_format: ResponseFormat::Text,
        }
    }

    // -- routing tests ---------------------------------------------------------

    #[tokio::test]
    async fn routes_by_provider_tag() {
        let router = RoutingProvider::new(vec![
            MockProvider::new(ProviderKind::OpenAi),
            MockProvider::new(ProviderKind::Anthropic),
            MockProvider::new(ProviderKind::Local),
        ]);

        for kind in [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Local] {
            let completion = router.complete(&request(kind)).await.unwrap();
            assert_eq!(completion.text, kind.as_str());
        }
    }

    #[tokio::test]
    async fn fallback_tag_is_never_routed() {
        let router = RoutingProvider::new(vec![MockProvider::new(ProviderKind::OpenAi)]);
        let err = router.complete(&request(ProviderKind::Fallback)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }

    #[tokio::test]
    async fn missing_adapter_is_unsupported() {
        let router = RoutingProvider::new(vec![MockProvider::new(ProviderKind::OpenAi)]);
        let err = router.complete(&request(ProviderKind::Anthropic)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }

    #[tokio::test]
    async fn http_adapters_share_transport() {
        let transport = FakeTransport::replying(
            200,
            json!({ "content": [{ "type": "text", "text": "hello" }] }),
        );
        let router = RoutingProvider::with_transport(transport.clone());
        let completion = router.complete(&request(ProviderKind::Anthropic)).await.unwrap();
        assert_eq!(completion.text, "hello");
        assert!(transport.last_request().url.ends_with("/v1/messages"));
    }
}
