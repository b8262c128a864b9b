//! Startup-time configuration errors

use thiserror::Error;

/// A subject configuration failed validation.
///
/// Every variant is fatal: the registry is never built from a partially
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown subject '{0}' in configuration")]
    UnknownSubject(String),

    #[error("subject '{0}' is configured more than once")]
    DuplicateSubject(String),

    #[error("{subject}: missing required field '{field}'")]
    MissingField { subject: String, field: String },

    #[error("{subject}: {field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        subject: String,
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("{subject}: {field} = '{value}' is not one of [{}]", .valid_values.join(", "))]
    InvalidEnumValue {
        subject: String,
        field: String,
        value: String,
        valid_values: Vec<String>,
    },

    #[error("{subject}: {message}")]
    InvalidTemplate { subject: String, message: String },

    #[error("{subject}: fallback pool is empty or has no positive weight")]
    EmptyFallbackPool { subject: String },

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

impl ConfigError {
    pub fn missing(subject: impl Into<String>, field: impl Into<String>) -> Self {
        ConfigError::MissingField {
            subject: subject.into(),
            field: field.into(),
        }
    }

    pub fn out_of_range(
        subject: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        ConfigError::OutOfRange {
            subject: subject.into(),
            field: field.into(),
            value: value.to_string(),
            expected,
        }
    }

    pub fn invalid_enum(
        subject: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        valid_values: &[&str],
    ) -> Self {
        ConfigError::InvalidEnumValue {
            subject: subject.into(),
            field: field.into(),
            value: value.into(),
            valid_values: valid_values.iter().map(|v| v.to_string()).collect(),
        }
    }
}
