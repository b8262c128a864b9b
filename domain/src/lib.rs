//! Domain layer for cake-ai
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Subject
//!
//! A use-case category (task creation, motivation, ...) with its own
//! prompts, primary model, cache policy and canned fallback pool. The
//! [`SubjectRegistry`] holds the validated configuration for every
//! configured subject and is built once at startup.
//!
//! ## Degradation tiers
//!
//! - **Cache**: a previous answer for the same rendered context
//! - **Primary**: a live model call, guarded by the circuit breaker
//! - **Fallback**: a weighted pick from the subject's static pool

pub mod cache;
pub mod circuit;
pub mod config;
pub mod core;
pub mod fallback;
pub mod prompt;
pub mod response;

// Re-export commonly used types
pub use cache::CacheKey;
pub use circuit::{Admission, CircuitSnapshot, CircuitState, CircuitStatus, CircuitTransition};
pub use config::{
    ApiKey, ConfigError, ModelConfig, ProviderKind, ResponseFormat, SubjectConfig, SubjectRegistry,
};
pub use core::{
    error::DomainError,
    subject::{ParseSubjectError, Subject},
};
pub use fallback::{FallbackPool, FallbackPoolError, FallbackResponse, weighted_pick};
pub use prompt::{ContextTemplate, TemplateError, sanitize_value, truncate_context};
pub use response::{
    FallbackReason, MoodHint, ResponseEnvelope, ResponseMetadata, ResponseSource, infer_mood,
};
