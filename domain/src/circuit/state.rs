//! Circuit breaker state machine for a single subject.
//!
//! Pure state: callers supply the current instant and hold whatever lock
//! guards the value. Transitions:
//!
//! ```text
//! closed --(failures >= threshold)--> open
//! open --(cool-down elapsed, next request)--> half-open (one probe admitted)
//! half-open --(success)--> closed
//! half-open --(failure)--> open (cool-down restarts)
//! ```

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Breaker status as exposed to monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitStatus {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitStatus::Closed => "closed",
            CircuitStatus::Open => "open",
            CircuitStatus::HalfOpen => "half-open",
        }
    }
}

impl std::fmt::Display for CircuitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of asking the breaker whether a request may call the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Closed breaker: call the provider with the full retry budget
    Attempt,
    /// This request is the single half-open probe: one attempt only
    Probe,
    /// Open breaker (or a probe is already in flight): go to fallback
    Rejected,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Rejected)
    }
}

/// A status change, reported so callers can log it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitTransition {
    pub from: CircuitStatus,
    pub to: CircuitStatus,
}

/// Point-in-time view for health endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    pub status: CircuitStatus,
    pub consecutive_failures: u32,
}

#[derive(Debug, Clone)]
pub struct CircuitState {
    status: CircuitStatus,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    last_probe_at: Option<Instant>,
    probe_in_flight: bool,
}

impl Default for CircuitState {
    fn default() -> Self {
        Self {
            status: CircuitStatus::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
            last_probe_at: None,
            probe_in_flight: false,
        }
    }
}

impl CircuitState {
    pub fn status(&self) -> CircuitStatus {
        self.status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_failure_at(&self) -> Option<Instant> {
        self.last_failure_at
    }

    pub fn last_probe_at(&self) -> Option<Instant> {
        self.last_probe_at
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        CircuitSnapshot {
            status: self.status,
            consecutive_failures: self.consecutive_failures,
        }
    }

    /// Decide whether a request may call the provider.
    ///
    /// Moving out of open happens here, so whoever holds the lock around
    /// this call is the only request that can become the probe.
    pub fn admit(&mut self, now: Instant, cooldown: Duration) -> (Admission, Option<CircuitTransition>) {
        match self.status {
            CircuitStatus::Closed => (Admission::Attempt, None),
            CircuitStatus::Open => {
                let cooled = self
                    .last_failure_at
                    .is_none_or(|at| now.saturating_duration_since(at) >= cooldown);
                if !cooled {
                    return (Admission::Rejected, None);
                }
                let transition = self.transition_to(CircuitStatus::HalfOpen);
                self.probe_in_flight = true;
                self.last_probe_at = Some(now);
                (Admission::Probe, transition)
            }
            CircuitStatus::HalfOpen => {
                if self.probe_in_flight {
                    return (Admission::Rejected, None);
                }
                self.probe_in_flight = true;
                self.last_probe_at = Some(now);
                (Admission::Probe, None)
            }
        }
    }

    /// Any success closes the breaker and clears the failure count
    pub fn record_success(&mut self) -> Option<CircuitTransition> {
        self.consecutive_failures = 0;
        self.probe_in_flight = false;
        self.transition_to(CircuitStatus::Closed)
    }

    pub fn record_failure(&mut self, now: Instant, threshold: u32) -> Option<CircuitTransition> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_failure_at = Some(now);

        match self.status {
            CircuitStatus::Closed if self.consecutive_failures >= threshold.max(1) => {
                self.transition_to(CircuitStatus::Open)
            }
            CircuitStatus::Closed => None,
            CircuitStatus::HalfOpen => {
                self.probe_in_flight = false;
                self.transition_to(CircuitStatus::Open)
            }
            // Late failures from requests admitted before the trip only
            // push the cool-down further out.
            CircuitStatus::Open => None,
        }
    }

    fn transition_to(&mut self, to: CircuitStatus) -> Option<CircuitTransition> {
        let from = self.status;
        if from == to {
            return None;
        }
        self.status = to;
        Some(CircuitTransition { from, to })
    }
}
