//! Port for structured generation logging.
//!
//! Defines the [`GenerationLogger`] trait for recording one event per
//! `generate` outcome and one per circuit transition.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures an audit
//! trail in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured generation event for logging.
pub struct GenerationEvent {
    /// Event type identifier (e.g., "generation", "circuit_transition").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl GenerationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging generation events to a structured log.
///
/// The `log` method is synchronous and non-fallible; implementations
/// swallow their own write failures.
pub trait GenerationLogger: Send + Sync {
    fn log(&self, event: GenerationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoGenerationLogger;

impl GenerationLogger for NoGenerationLogger {
    fn log(&self, _event: GenerationEvent) {}
}
