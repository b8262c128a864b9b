//! Domain error types

use thiserror::Error;

/// Per-request domain errors.
///
/// These come from caller input and are always recoverable: the caller
/// passed a subject nobody configured, or left a template placeholder
/// without a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Missing template variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

impl DomainError {
    /// Check if this error was caused by an unregistered subject
    pub fn is_unknown_subject(&self) -> bool {
        matches!(self, DomainError::UnknownSubject(_))
    }
}
