//! Check Connectivity use case.
//!
//! Sends one attempt to every live provider the registry uses and reports
//! whether it answered and how long it took. The outcome is fed to the
//! breaker of every subject backed by that provider, so an operator can
//! close breakers by hand once a provider is back.

use super::connectivity::ConnectivityMonitor;
use super::invoke_provider::ProviderClient;
use crate::ports::completion_provider::CompletionRequest;
use cake_domain::{ProviderKind, ResponseFormat, Subject, SubjectConfig, SubjectRegistry};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

const CHECK_CONTEXT: &str = "Connectivity check. Reply with a short greeting.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityStatus {
    Connected,
    Disconnected,
    /// The static pool needs no network
    AlwaysAvailable,
}

impl ConnectivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityStatus::Connected => "connected",
            ConnectivityStatus::Disconnected => "disconnected",
            ConnectivityStatus::AlwaysAvailable => "always_available",
        }
    }
}

impl std::fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking one provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderConnectivity {
    pub provider: ProviderKind,
    /// Model the check was sent to
    pub model: String,
    pub status: ConnectivityStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Subjects whose primary model uses this provider
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectivityReport {
    pub providers: Vec<ProviderConnectivity>,
}

impl ConnectivityReport {
    pub fn all_connected(&self) -> bool {
        self.providers
            .iter()
            .all(|p| p.status != ConnectivityStatus::Disconnected)
    }
}

pub struct CheckConnectivity<'a> {
    registry: &'a SubjectRegistry,
    client: &'a ProviderClient,
    monitor: &'a ConnectivityMonitor,
}

impl<'a> CheckConnectivity<'a> {
    pub fn new(
        registry: &'a SubjectRegistry,
        client: &'a ProviderClient,
        monitor: &'a ConnectivityMonitor,
    ) -> Self {
        Self {
            registry,
            client,
            monitor,
        }
    }

    pub async fn execute(&self) -> ConnectivityReport {
        let mut providers = Vec::new();
        for (representative, subjects) in self.providers_in_use() {
            providers.push(self.check(representative, subjects).await);
        }
        providers.push(ProviderConnectivity {
            provider: ProviderKind::Fallback,
            model: "static_responses".to_string(),
            status: ConnectivityStatus::AlwaysAvailable,
            response_time_ms: 0,
            error: None,
            subjects: self.registry.subjects().collect(),
        });
        ConnectivityReport { providers }
    }

    /// Live providers in first-seen order, each with the first subject
    /// that uses it and the full list of subjects that do.
    fn providers_in_use(&self) -> Vec<(&'a SubjectConfig, Vec<Subject>)> {
        let mut groups: Vec<(&'a SubjectConfig, Vec<Subject>)> = Vec::new();
        for config in self.registry.configs() {
            let provider = config.primary_model.provider;
            match groups
                .iter_mut()
                .find(|(rep, _)| rep.primary_model.provider == provider)
            {
                Some((_, subjects)) => subjects.push(config.subject),
                None => groups.push((config, vec![config.subject])),
            }
        }
        groups
    }

    async fn check(&self, representative: &SubjectConfig, subjects: Vec<Subject>) -> ProviderConnectivity {
        let request = CompletionRequest {
            subject: representative.subject,
            model: representative.primary_model.clone(),
            system_prompt: representative.system_prompt.clone(),
            context: CHECK_CONTEXT.to_string(),
            response_format: ResponseFormat::Text,
        };
        let provider = request.model.provider;

        let started = Instant::now();
        // invoke reports the attempt for the representative subject
        let result = self.client.invoke(&request, 1).await;
        let elapsed = started.elapsed();

        for subject in subjects.iter().filter(|s| **s != representative.subject) {
            match result {
                Ok(_) => self.monitor.record_success(*subject, elapsed),
                Err(_) => self.monitor.record_failure(*subject, elapsed),
            }
        }

        let (status, error) = match result {
            Ok(_) => {
                info!("Provider {} reachable in {:?}", provider, elapsed);
                (ConnectivityStatus::Connected, None)
            }
            Err(e) => {
                warn!("Provider {} unreachable: {}", provider, e.last_error);
                (ConnectivityStatus::Disconnected, Some(e.last_error.to_string()))
            }
        };

        ProviderConnectivity {
            provider,
            model: request.model.model_name,
            status,
            response_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error,
            subjects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BreakerSettings;
    use crate::ports::completion_provider::{Completion, CompletionProvider, ProviderError};
    use async_trait::async_trait;
    use cake_domain::{
        CircuitStatus, ContextTemplate, FallbackPool, FallbackResponse, ModelConfig,
    };
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers every provider except the ones listed as down
    struct PartialOutage {
        down: Vec<ProviderKind>,
        seen: Mutex<Vec<(ProviderKind, String)>>,
    }

    #[async_trait]
    impl CompletionProvider for PartialOutage {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
            self.seen
                .lock()
                .unwrap()
                .push((request.model.provider, request.context.clone()));
            tokio::time::sleep(Duration::from_millis(250)).await;
            if self.down.contains(&request.model.provider) {
                Err(ProviderError::Connection("refused".to_string()))
            } else {
                Ok(Completion::new("Hello there!"))
            }
        }
    }

    fn config(subject: Subject, provider: ProviderKind, model: &str) -> SubjectConfig {
        SubjectConfig::new(
            subject,
            ModelConfig::new(provider, model).with_retry(3, 1.0),
            "Be kind.",
            ContextTemplate::parse("Note: {note}").unwrap(),
            FallbackPool::new(vec![FallbackResponse::new("Hi!", 1.0)]).unwrap(),
        )
    }

    fn registry() -> SubjectRegistry {
        SubjectRegistry::load([
            config(Subject::TaskCreation, ProviderKind::OpenAi, "gpt-3.5-turbo"),
            config(Subject::Motivation, ProviderKind::OpenAi, "gpt-3.5-turbo"),
            config(Subject::Celebration, ProviderKind::Anthropic, "claude-3-haiku"),
        ])
        .unwrap()
    }

    fn setup(down: Vec<ProviderKind>) -> (SubjectRegistry, ProviderClient, Arc<ConnectivityMonitor>, Arc<PartialOutage>) {
        let registry = registry();
        let settings = BreakerSettings::default().with_failure_threshold(1);
        let monitor = Arc::new(ConnectivityMonitor::new(&registry, &settings));
        let provider = Arc::new(PartialOutage {
            down,
            seen: Mutex::new(Vec::new()),
        });
        let client = ProviderClient::new(provider.clone(), monitor.clone());
        (registry, client, monitor, provider)
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_attempt_per_provider() {
        let (registry, client, monitor, provider) = setup(vec![]);
        CheckConnectivity::new(&registry, &client, &monitor).execute().await;

        let seen = provider.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, ProviderKind::OpenAi);
        assert_eq!(seen[1].0, ProviderKind::Anthropic);
        assert!(seen.iter().all(|(_, context)| context == CHECK_CONTEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_lists_status_latency_and_subjects() {
        let (registry, client, monitor, _) = setup(vec![ProviderKind::Anthropic]);
        let report = CheckConnectivity::new(&registry, &client, &monitor).execute().await;

        assert_eq!(report.providers.len(), 3);
        let openai = &report.providers[0];
        assert_eq!(openai.provider, ProviderKind::OpenAi);
        assert_eq!(openai.status, ConnectivityStatus::Connected);
        assert_eq!(openai.response_time_ms, 250);
        assert_eq!(openai.subjects, vec![Subject::TaskCreation, Subject::Motivation]);
        assert_eq!(openai.error, None);

        let anthropic = &report.providers[1];
        assert_eq!(anthropic.status, ConnectivityStatus::Disconnected);
        assert_eq!(anthropic.model, "claude-3-haiku");
        assert!(anthropic.error.as_deref().unwrap().contains("refused"));

        let fallback = &report.providers[2];
        assert_eq!(fallback.status, ConnectivityStatus::AlwaysAvailable);
        assert_eq!(fallback.subjects.len(), 3);
        assert!(!report.all_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcome_feeds_every_subject_on_the_provider() {
        let (registry, client, monitor, _) = setup(vec![ProviderKind::OpenAi]);
        CheckConnectivity::new(&registry, &client, &monitor).execute().await;

        // threshold 1: one failed check opens both openai subjects
        for subject in [Subject::TaskCreation, Subject::Motivation] {
            assert_eq!(monitor.snapshot(subject).unwrap().status, CircuitStatus::Open);
            assert_eq!(monitor.stats(subject).unwrap().total_attempts, 1);
        }
        assert_eq!(
            monitor.snapshot(Subject::Celebration).unwrap().status,
            CircuitStatus::Closed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_check_closes_open_breakers() {
        let (registry, client, monitor, _) = setup(vec![]);
        monitor.record_failure(Subject::Motivation, Duration::from_millis(5));
        assert_eq!(monitor.snapshot(Subject::Motivation).unwrap().status, CircuitStatus::Open);

        let report = CheckConnectivity::new(&registry, &client, &monitor).execute().await;
        assert!(report.all_connected());
        assert_eq!(monitor.snapshot(Subject::Motivation).unwrap().status, CircuitStatus::Closed);
    }
}
