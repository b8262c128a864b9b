//! Generate Response use case.
//!
//! The entry point collaborators call. For a subject and a variable map it
//! always produces a [`ResponseEnvelope`], degrading through three tiers:
//!
//! 1. **Cache**: a live entry for the same rendered context
//! 2. **Primary**: the subject's model via [`ProviderClient`], when the
//!    circuit breaker admits the request
//! 3. **Fallback**: a weighted pick from the subject's static pool
//!
//! Only caller-input problems (unknown subject, missing template variables)
//! surface as errors. Provider and cache failures never do.
//!
//! Concurrent misses on the same key are coalesced: the first caller spawns
//! the provider work and everyone else awaits the same outcome.
//!
//! A forced generation skips the cache lookup but still honors the breaker,
//! and a successful answer replaces the cached one.

use super::check_connectivity::{CheckConnectivity, ConnectivityReport};
use super::connectivity::{AttemptStats, ConnectivityMonitor};
use super::invoke_provider::ProviderClient;
use crate::config::BreakerSettings;
use crate::ports::completion_provider::{CompletionProvider, CompletionRequest};
use crate::ports::generation_logger::{GenerationEvent, GenerationLogger, NoGenerationLogger};
use crate::ports::response_cache::ResponseCache;
use cake_domain::{
    Admission, CacheKey, CircuitSnapshot, DomainError, FallbackReason, ProviderKind,
    ResponseEnvelope, ResponseMetadata, ResponseSource, Subject, SubjectConfig, SubjectRegistry,
};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Caller-input errors from [`ResponseOrchestrator::generate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Missing template variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

impl From<DomainError> for GenerateError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::UnknownSubject(name) => GenerateError::UnknownSubject(name),
            DomainError::MissingVariables(names) => GenerateError::MissingVariables(names),
        }
    }
}

/// Monitoring view of one subject
#[derive(Debug, Clone, Serialize)]
pub struct SubjectStatus {
    pub subject: Subject,
    pub provider: ProviderKind,
    pub model: String,
    pub circuit: CircuitSnapshot,
    pub cooldown_seconds: f64,
    pub attempts: AttemptStats,
    pub fallback_pool_size: usize,
    pub cache_enabled: bool,
}

/// Monitoring view of the whole orchestrator
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub subjects: Vec<SubjectStatus>,
    /// `None` when the cache backend could not be queried
    pub cache_entries: Option<usize>,
}

/// Outcome of the primary tier, shared between coalesced callers
#[derive(Debug, Clone)]
enum PrimaryOutcome {
    Completed {
        text: String,
        tokens_used: Option<u32>,
        attempts: u32,
    },
    Rejected,
    Unavailable {
        attempts: u32,
    },
}

impl PrimaryOutcome {
    fn attempts(&self) -> u32 {
        match self {
            PrimaryOutcome::Completed { attempts, .. } | PrimaryOutcome::Unavailable { attempts } => {
                *attempts
            }
            PrimaryOutcome::Rejected => 0,
        }
    }
}

type SharedOutcome = Shared<BoxFuture<'static, PrimaryOutcome>>;
type InFlight = tokio::sync::Mutex<HashMap<CacheKey, SharedOutcome>>;

/// Use case for generating subject-scoped responses.
pub struct ResponseOrchestrator {
    registry: Arc<SubjectRegistry>,
    cache: Arc<dyn ResponseCache>,
    client: ProviderClient,
    monitor: Arc<ConnectivityMonitor>,
    in_flight: Arc<HashMap<Subject, InFlight>>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    logger: Arc<dyn GenerationLogger>,
}

impl ResponseOrchestrator {
    pub fn new(
        registry: Arc<SubjectRegistry>,
        provider: Arc<dyn CompletionProvider>,
        cache: Arc<dyn ResponseCache>,
        settings: BreakerSettings,
    ) -> Self {
        Self::build(registry, provider, cache, settings, Arc::new(NoGenerationLogger))
    }

    /// Create with a generation logger; breaker transitions are logged too.
    pub fn with_logger(
        registry: Arc<SubjectRegistry>,
        provider: Arc<dyn CompletionProvider>,
        cache: Arc<dyn ResponseCache>,
        settings: BreakerSettings,
        logger: Arc<dyn GenerationLogger>,
    ) -> Self {
        Self::build(registry, provider, cache, settings, logger)
    }

    fn build(
        registry: Arc<SubjectRegistry>,
        provider: Arc<dyn CompletionProvider>,
        cache: Arc<dyn ResponseCache>,
        settings: BreakerSettings,
        logger: Arc<dyn GenerationLogger>,
    ) -> Self {
        let monitor =
            Arc::new(ConnectivityMonitor::new(&registry, &settings).with_logger(logger.clone()));
        let in_flight = registry
            .subjects()
            .map(|subject| (subject, InFlight::default()))
            .collect();
        Self {
            client: ProviderClient::new(provider, monitor.clone()),
            monitor,
            registry,
            cache,
            in_flight: Arc::new(in_flight),
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
            logger,
        }
    }

    /// Replace the random source used for fallback selection.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    pub fn registry(&self) -> &SubjectRegistry {
        &self.registry
    }

    // ==================== Operations ====================

    /// Produce a response for `subject` rendered from `variables`.
    pub async fn generate(
        &self,
        subject: &str,
        variables: &HashMap<String, String>,
    ) -> Result<ResponseEnvelope, GenerateError> {
        self.generate_with(subject, variables, false).await
    }

    /// Like [`generate`](Self::generate), but never answers from the cache.
    ///
    /// A primary answer overwrites the cached entry for the same context.
    pub async fn generate_forced(
        &self,
        subject: &str,
        variables: &HashMap<String, String>,
    ) -> Result<ResponseEnvelope, GenerateError> {
        self.generate_with(subject, variables, true).await
    }

    async fn generate_with(
        &self,
        subject: &str,
        variables: &HashMap<String, String>,
        force: bool,
    ) -> Result<ResponseEnvelope, GenerateError> {
        let started = Instant::now();
        let config = self.registry.get(subject)?;
        let context = config.render_context(variables)?;
        let key = CacheKey::new(config.subject, &context);

        if !force && let Some(envelope) = self.cached(config, &key).await {
            self.record(&envelope, started, 0);
            return Ok(envelope);
        }

        let outcome = match self.join_or_lead(config, key, context, force).await {
            Ok(outcome) => outcome,
            Err(envelope) => {
                // The cache was filled while we waited for the in-flight lock
                self.record(&envelope, started, 0);
                return Ok(envelope);
            }
        };

        let envelope = match &outcome {
            PrimaryOutcome::Completed {
                text, tokens_used, ..
            } => ResponseEnvelope::primary(
                config.subject,
                text.clone(),
                ResponseMetadata {
                    model: Some(config.primary_model.model_name.clone()),
                    provider: Some(config.primary_model.provider.as_str().to_string()),
                    tokens_used: *tokens_used,
                    fallback_reason: None,
                },
            ),
            PrimaryOutcome::Rejected => self.fallback(config, variables, FallbackReason::CircuitOpen),
            PrimaryOutcome::Unavailable { .. } => {
                self.fallback(config, variables, FallbackReason::ProviderUnavailable)
            }
        };
        self.record(&envelope, started, outcome.attempts());
        Ok(envelope)
    }

    /// Breaker status for `subject`, for health endpoints.
    pub fn circuit_state(&self, subject: &str) -> Result<CircuitSnapshot, GenerateError> {
        let config = self.registry.get(subject)?;
        self.monitor
            .snapshot(config.subject)
            .ok_or_else(|| GenerateError::UnknownSubject(subject.to_string()))
    }

    /// Circuit, attempt and cache overview for every configured subject.
    pub async fn status(&self) -> OrchestratorStatus {
        let subjects = self
            .registry
            .configs()
            .filter_map(|config| {
                Some(SubjectStatus {
                    subject: config.subject,
                    provider: config.primary_model.provider,
                    model: config.primary_model.model_name.clone(),
                    circuit: self.monitor.snapshot(config.subject)?,
                    cooldown_seconds: self.monitor.cooldown(config.subject)?.as_secs_f64(),
                    attempts: self.monitor.stats(config.subject)?,
                    fallback_pool_size: config.fallback_responses.len(),
                    cache_enabled: config.cache_enabled,
                })
            })
            .collect();
        let cache_entries = match self.cache.len().await {
            Ok(len) => Some(len),
            Err(e) => {
                warn!("Failed to read cache size: {}", e);
                None
            }
        };
        OrchestratorStatus {
            subjects,
            cache_entries,
        }
    }

    /// Send one attempt to every live provider in use and report the results.
    pub async fn check_connectivity(&self) -> ConnectivityReport {
        CheckConnectivity::new(&self.registry, &self.client, &self.monitor)
            .execute()
            .await
    }

    /// Drop every cached response. Failures are logged, never returned.
    pub async fn clear_cache(&self) {
        match self.cache.clear().await {
            Ok(()) => info!("Response cache cleared"),
            Err(e) => warn!("Failed to clear response cache: {}", e),
        }
    }

    // ==================== Tiers ====================

    async fn cached(&self, config: &SubjectConfig, key: &CacheKey) -> Option<ResponseEnvelope> {
        if !config.cache_enabled {
            return None;
        }
        match self.cache.get(key).await {
            Ok(Some(entry)) => {
                debug!("Cache hit for {}", key);
                Some(ResponseEnvelope::cached(config.subject, entry.text))
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cache lookup failed for {}: {}", config.subject, e);
                None
            }
        }
    }

    /// Await the in-flight outcome for `key`, starting it if nobody has.
    ///
    /// Returns `Err` with a cached envelope when the cache was filled
    /// between the first lookup and taking the lock (never when forced).
    async fn join_or_lead(
        &self,
        config: &SubjectConfig,
        key: CacheKey,
        context: String,
        force: bool,
    ) -> Result<PrimaryOutcome, ResponseEnvelope> {
        let Some(in_flight) = self.in_flight.get(&config.subject) else {
            return Ok(PrimaryOutcome::Rejected);
        };

        let shared = {
            let mut pending = in_flight.lock().await;
            if let Some(shared) = pending.get(&key) {
                debug!("Joining in-flight request for {}", key);
                shared.clone()
            } else {
                if !force && let Some(envelope) = self.cached(config, &key).await {
                    return Err(envelope);
                }
                let max_attempts = match self.monitor.try_admit(config.subject) {
                    Admission::Rejected => {
                        debug!("Circuit open for {}, skipping provider", config.subject);
                        return Ok(PrimaryOutcome::Rejected);
                    }
                    Admission::Probe => 1,
                    Admission::Attempt => config.primary_model.max_attempts(),
                };
                let shared = self.lead(config, key.clone(), context, max_attempts);
                pending.insert(key, shared.clone());
                shared
            }
        };

        Ok(shared.await)
    }

    /// Spawn the provider work so it completes even if every caller goes away.
    fn lead(
        &self,
        config: &SubjectConfig,
        key: CacheKey,
        context: String,
        max_attempts: u32,
    ) -> SharedOutcome {
        let request = CompletionRequest {
            subject: config.subject,
            model: config.primary_model.clone(),
            system_prompt: config.system_prompt.clone(),
            context,
            response_format: config.response_format,
        };
        let ttl = config.cache_enabled.then(|| config.cache_ttl());
        let client = self.client.clone();
        let cache = self.cache.clone();
        let monitor = self.monitor.clone();
        let in_flight = self.in_flight.clone();
        let subject = config.subject;
        let started = Instant::now();

        let handle = {
            let in_flight = in_flight.clone();
            let monitor = monitor.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let work = AssertUnwindSafe(invoke_and_store(
                    &client,
                    cache.as_ref(),
                    &request,
                    &key,
                    ttl,
                    max_attempts,
                ));
                let outcome = match work.catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        // The attempt never reported; count it so a probe
                        // cannot leave the breaker half-open.
                        warn!("Provider task for {} panicked", request.subject);
                        monitor.record_failure(request.subject, started.elapsed());
                        PrimaryOutcome::Unavailable {
                            attempts: max_attempts,
                        }
                    }
                };
                if let Some(pending) = in_flight.get(&request.subject) {
                    pending.lock().await.remove(&key);
                }
                outcome
            })
        };

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Provider task for {} did not complete: {}", subject, e);
                    monitor.record_failure(subject, started.elapsed());
                    if let Some(pending) = in_flight.get(&subject) {
                        pending.lock().await.remove(&key);
                    }
                    PrimaryOutcome::Unavailable { attempts: 0 }
                }
            }
        }
        .boxed()
        .shared()
    }

    fn fallback(
        &self,
        config: &SubjectConfig,
        variables: &HashMap<String, String>,
        reason: FallbackReason,
    ) -> ResponseEnvelope {
        let context_type = variables.get("context_type").map(String::as_str);
        let mood = variables.get("mood").map(String::as_str);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let picked = config
            .fallback_responses
            .pick(context_type, mood, &mut **rng);
        ResponseEnvelope::fallback(config.subject, picked, reason)
    }

    fn record(&self, envelope: &ResponseEnvelope, started: Instant, attempts: u32) {
        let latency = started.elapsed();
        match envelope.source {
            ResponseSource::Fallback => info!(
                "Served fallback for {} ({})",
                envelope.subject,
                envelope
                    .metadata
                    .fallback_reason
                    .map(|r| r.as_str())
                    .unwrap_or("unknown")
            ),
            source => info!("Served {} response for {} in {:?}", source, envelope.subject, latency),
        }
        self.logger.log(GenerationEvent::new(
            "generation",
            serde_json::json!({
                "subject": envelope.subject.as_str(),
                "source": envelope.source.as_str(),
                "latency_ms": u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                "attempts": attempts,
                "fallback_reason": envelope.metadata.fallback_reason.map(|r| r.as_str()),
            }),
        ));
    }
}

async fn invoke_and_store(
    client: &ProviderClient,
    cache: &dyn ResponseCache,
    request: &CompletionRequest,
    key: &CacheKey,
    ttl: Option<Duration>,
    max_attempts: u32,
) -> PrimaryOutcome {
    match client.invoke(request, max_attempts).await {
        Ok(invocation) => {
            if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
                if let Err(e) = cache
                    .put(key.clone(), invocation.completion.text.clone(), ttl)
                    .await
                {
                    warn!("Cache write failed for {}: {}", request.subject, e);
                }
            }
            PrimaryOutcome::Completed {
                text: invocation.completion.text,
                tokens_used: invocation.completion.tokens_used,
                attempts: invocation.attempts,
            }
        }
        Err(unavailable) => PrimaryOutcome::Unavailable {
            attempts: unavailable.attempts,
        },
    }
}
