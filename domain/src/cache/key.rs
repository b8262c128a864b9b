//! Cache key derivation

use crate::core::subject::Subject;
use sha2::{Digest, Sha256};

/// Deterministic key for a rendered request.
///
/// SHA-256 over the subject name and the rendered context, separated by a
/// NUL byte so no subject/context pair can collide with another by
/// shifting characters across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    subject: Subject,
    digest: String,
}

impl CacheKey {
    pub fn new(subject: Subject, rendered_context: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(subject.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(rendered_context.as_bytes());
        Self {
            subject,
            digest: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Hex-encoded SHA-256
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.subject, self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_input_same_key() {
        let a = CacheKey::new(Subject::TaskCreation, "Buy milk");
        let b = CacheKey::new(Subject::TaskCreation, "Buy milk");
        assert_eq!(a, b);
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn test_subject_is_part_of_key() {
        let a = CacheKey::new(Subject::TaskCreation, "Buy milk");
        let b = CacheKey::new(Subject::TaskCompletion, "Buy milk");
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_context_changes_key() {
        let a = CacheKey::new(Subject::Motivation, "streak 3");
        let b = CacheKey::new(Subject::Motivation, "streak 4");
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let key = CacheKey::new(Subject::Motivation, "");
        assert!(key.to_string().starts_with("motivation:"));
    }
}
