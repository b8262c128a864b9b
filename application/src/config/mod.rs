//! Application-level configuration.
//!
//! - [`BreakerSettings`]: circuit breaker threshold and cool-down resolution

pub mod breaker_settings;

pub use breaker_settings::BreakerSettings;
