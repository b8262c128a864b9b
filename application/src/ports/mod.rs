//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod completion_provider;
pub mod generation_logger;
pub mod response_cache;
