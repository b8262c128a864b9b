//! Infrastructure layer for cake-ai
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod cache;
pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use cache::InMemoryResponseCache;
pub use config::{
    ConfigLoader, FileCircuitBreakerConfig, FileConfig, FileFallbackResponse, FileModelConfig,
    FileSubjectConfig,
};
pub use logging::JsonlGenerationLogger;
pub use providers::{AnthropicAdapter, OpenAiAdapter, ProviderAdapter, RoutingProvider};
