//! Application layer for cake-ai
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BreakerSettings;
pub use ports::{
    completion_provider::{Completion, CompletionProvider, CompletionRequest, ProviderError},
    generation_logger::{GenerationEvent, GenerationLogger, NoGenerationLogger},
    response_cache::{CacheEntry, CacheError, ResponseCache},
};
pub use use_cases::check_connectivity::{
    CheckConnectivity, ConnectivityReport, ConnectivityStatus, ProviderConnectivity,
};
pub use use_cases::connectivity::{AttemptStats, ConnectivityMonitor};
pub use use_cases::generate_response::{
    GenerateError, OrchestratorStatus, ResponseOrchestrator, SubjectStatus,
};
pub use use_cases::invoke_provider::{Invocation, ProviderClient, ProviderUnavailable};
