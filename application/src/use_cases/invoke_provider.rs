//! Invoke Provider use case.
//!
//! Calls the primary model with a per-attempt timeout and a fixed-delay
//! retry loop. Every attempt, successful or not, is reported to the
//! [`ConnectivityMonitor`] so breaker accounting is per attempt.

use super::connectivity::ConnectivityMonitor;
use crate::ports::completion_provider::{
    Completion, CompletionProvider, CompletionRequest, ProviderError,
};
use cake_domain::{Subject, truncate_context};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Every attempt for a request failed
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Provider unavailable for {subject} after {attempts} attempt(s): {last_error}")]
pub struct ProviderUnavailable {
    pub subject: Subject,
    pub attempts: u32,
    pub last_error: ProviderError,
}

/// A completion and the number of attempts it took
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub completion: Completion,
    pub attempts: u32,
}

#[derive(Clone)]
pub struct ProviderClient {
    provider: Arc<dyn CompletionProvider>,
    monitor: Arc<ConnectivityMonitor>,
}

impl ProviderClient {
    pub fn new(provider: Arc<dyn CompletionProvider>, monitor: Arc<ConnectivityMonitor>) -> Self {
        Self { provider, monitor }
    }

    /// Call the provider at most `max_attempts` times (at least once).
    ///
    /// Attempts are serial, each bounded by the model's timeout, with the
    /// model's retry delay between them. A reply that is empty or does not
    /// satisfy the subject's response format counts as a failed attempt.
    pub async fn invoke(
        &self,
        request: &CompletionRequest,
        max_attempts: u32,
    ) -> Result<Invocation, ProviderUnavailable> {
        let max_attempts = max_attempts.max(1);
        let timeout = request.model.timeout();
        let delay = request.model.retry_delay();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            let result = match tokio::time::timeout(timeout, self.provider.complete(request)).await {
                Ok(result) => result.and_then(|completion| Self::check(request, completion)),
                Err(_) => Err(ProviderError::Timeout(timeout)),
            };
            let latency = started.elapsed();

            match result {
                Ok(completion) => {
                    self.monitor.record_success(request.subject, latency);
                    debug!(
                        "Provider answered {} on attempt {}/{} in {:?}",
                        request.subject, attempt, max_attempts, latency
                    );
                    return Ok(Invocation {
                        completion,
                        attempts: attempt,
                    });
                }
                Err(error) => {
                    self.monitor.record_failure(request.subject, latency);
                    if attempt >= max_attempts {
                        warn!(
                            "Provider failed for {} after {} attempt(s): {}",
                            request.subject, attempt, error
                        );
                        return Err(ProviderUnavailable {
                            subject: request.subject,
                            attempts: attempt,
                            last_error: error,
                        });
                    }
                    debug!(
                        "Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                        attempt, max_attempts, request.subject, error, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn check(request: &CompletionRequest, completion: Completion) -> Result<Completion, ProviderError> {
        if completion.text.trim().is_empty() {
            return Err(ProviderError::InvalidResponse("empty completion".to_string()));
        }
        if !request.response_format.accepts(&completion.text) {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} but got: {}",
                request.response_format.as_str(),
                truncate_context(&completion.text, 80)
            )));
        }
        Ok(completion)
    }
}
