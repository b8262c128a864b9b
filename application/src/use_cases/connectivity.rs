//! Connectivity monitor.
//!
//! Owns one circuit breaker per configured subject plus the attempt
//! statistics shown by `status`. The set of subjects is fixed at
//! construction, so every lookup is lock-free on the map and each subject
//! has its own mutex: subjects never contend with each other.

use crate::config::BreakerSettings;
use crate::ports::generation_logger::{GenerationEvent, GenerationLogger, NoGenerationLogger};
use cake_domain::{
    Admission, CircuitSnapshot, CircuitState, CircuitStatus, CircuitTransition, Subject,
    SubjectRegistry,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Attempt counters for one subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttemptStats {
    pub total_attempts: u64,
    pub failed_attempts: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_latency_ms: Option<u64>,
}

struct SubjectCircuit {
    state: Mutex<CircuitState>,
    stats: Mutex<AttemptStats>,
    cooldown: Duration,
}

impl SubjectCircuit {
    fn state(&self) -> MutexGuard<'_, CircuitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stats(&self) -> MutexGuard<'_, AttemptStats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct ConnectivityMonitor {
    circuits: HashMap<Subject, SubjectCircuit>,
    failure_threshold: u32,
    logger: Arc<dyn GenerationLogger>,
}

impl ConnectivityMonitor {
    pub fn new(registry: &SubjectRegistry, settings: &BreakerSettings) -> Self {
        let circuits = registry
            .configs()
            .map(|config| {
                let circuit = SubjectCircuit {
                    state: Mutex::new(CircuitState::default()),
                    stats: Mutex::new(AttemptStats::default()),
                    cooldown: settings.cooldown_for(&config.primary_model),
                };
                (config.subject, circuit)
            })
            .collect();
        Self {
            circuits,
            failure_threshold: settings.failure_threshold.max(1),
            logger: Arc::new(NoGenerationLogger),
        }
    }

    /// Create with a generation logger for transition events.
    pub fn with_logger(mut self, logger: Arc<dyn GenerationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Ask whether a request for `subject` may call the provider.
    ///
    /// Unmonitored subjects are always attempted.
    pub fn try_admit(&self, subject: Subject) -> Admission {
        let Some(circuit) = self.circuits.get(&subject) else {
            return Admission::Attempt;
        };
        let now = Instant::now().into_std();
        let (admission, transition) = circuit.state().admit(now, circuit.cooldown);
        if let Some(transition) = transition {
            self.report(subject, transition);
        }
        debug!("Circuit admission for {}: {:?}", subject, admission);
        admission
    }

    pub fn record_success(&self, subject: Subject, latency: Duration) {
        let Some(circuit) = self.circuits.get(&subject) else {
            return;
        };
        Self::count(circuit, latency, false);
        let transition = circuit.state().record_success();
        if let Some(transition) = transition {
            self.report(subject, transition);
        }
    }

    pub fn record_failure(&self, subject: Subject, latency: Duration) {
        let Some(circuit) = self.circuits.get(&subject) else {
            return;
        };
        Self::count(circuit, latency, true);
        let now = Instant::now().into_std();
        let transition = circuit.state().record_failure(now, self.failure_threshold);
        if let Some(transition) = transition {
            self.report(subject, transition);
        }
    }

    pub fn snapshot(&self, subject: Subject) -> Option<CircuitSnapshot> {
        self.circuits.get(&subject).map(|c| c.state().snapshot())
    }

    pub fn stats(&self, subject: Subject) -> Option<AttemptStats> {
        self.circuits.get(&subject).map(|c| *c.stats())
    }

    pub fn cooldown(&self, subject: Subject) -> Option<Duration> {
        self.circuits.get(&subject).map(|c| c.cooldown)
    }

    fn count(circuit: &SubjectCircuit, latency: Duration, failed: bool) {
        let mut stats = circuit.stats();
        stats.total_attempts += 1;
        if failed {
            stats.failed_attempts += 1;
        }
        stats.last_latency_ms = Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX));
    }

    fn report(&self, subject: Subject, transition: CircuitTransition) {
        if transition.to == CircuitStatus::Open {
            warn!(
                "Circuit for {} opened ({} -> {})",
                subject, transition.from, transition.to
            );
        } else {
            info!(
                "Circuit for {}: {} -> {}",
                subject, transition.from, transition.to
            );
        }
        self.logger.log(GenerationEvent::new(
            "circuit_transition",
            serde_json::json!({
                "subject": subject.as_str(),
                "from": transition.from.as_str(),
                "to": transition.to.as_str(),
            }),
        ));
    }
}
