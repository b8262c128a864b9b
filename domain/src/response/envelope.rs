//! The value returned to callers of `generate`

use super::mood::infer_mood;
use crate::core::subject::Subject;
use crate::fallback::FallbackResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the text of a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Primary,
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Primary => "primary",
            ResponseSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the static tier answered instead of the primary model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The breaker rejected the request before any provider call
    CircuitOpen,
    /// The provider was called and every attempt failed
    ProviderUnavailable,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::CircuitOpen => "circuit_open",
            FallbackReason::ProviderUnavailable => "provider_unavailable",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

/// Immutable response handed to the caller.
///
/// Fields are public for reading; construct through `primary`, `cached`
/// or `fallback` so the mood hints stay consistent with the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub text: String,
    pub source: ResponseSource,
    pub subject: Subject,
    pub generated_at: DateTime<Utc>,
    pub mood: String,
    pub animation: String,
    pub metadata: ResponseMetadata,
}

impl ResponseEnvelope {
    pub fn primary(subject: Subject, text: impl Into<String>, metadata: ResponseMetadata) -> Self {
        Self::inferred(subject, text.into(), ResponseSource::Primary, metadata)
    }

    pub fn cached(subject: Subject, text: impl Into<String>) -> Self {
        Self::inferred(subject, text.into(), ResponseSource::Cache, ResponseMetadata::default())
    }

    pub fn fallback(subject: Subject, response: &FallbackResponse, reason: FallbackReason) -> Self {
        Self {
            text: response.text.clone(),
            source: ResponseSource::Fallback,
            subject,
            generated_at: Utc::now(),
            mood: response.mood.clone(),
            animation: response.animation.clone(),
            metadata: ResponseMetadata {
                fallback_reason: Some(reason),
                ..ResponseMetadata::default()
            },
        }
    }

    fn inferred(subject: Subject, text: String, source: ResponseSource, metadata: ResponseMetadata) -> Self {
        let hint = infer_mood(&text);
        Self {
            text,
            source,
            subject,
            generated_at: Utc::now(),
            mood: hint.mood.to_string(),
            animation: hint.animation.to_string(),
            metadata,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.source == ResponseSource::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_infers_mood() {
        let env = ResponseEnvelope::primary(
            Subject::Celebration,
            "Let's celebrate this win!",
            ResponseMetadata {
                model: Some("gpt-3.5-turbo".into()),
                provider: Some("openai".into()),
                tokens_used: Some(12),
                fallback_reason: None,
            },
        );
        assert_eq!(env.source, ResponseSource::Primary);
        assert_eq!(env.mood, "celebratory");
        assert_eq!(env.animation, "confetti_explosion");
        assert!(!env.is_degraded());
    }

    #[test]
    fn test_fallback_uses_entry_hints() {
        let entry = FallbackResponse::new("Keep going", 1.0)
            .with_mood("supportive")
            .with_animation("gentle_sway");
        let env = ResponseEnvelope::fallback(Subject::Motivation, &entry, FallbackReason::CircuitOpen);
        assert_eq!(env.text, "Keep going");
        assert_eq!(env.mood, "supportive");
        assert_eq!(env.animation, "gentle_sway");
        assert_eq!(env.metadata.fallback_reason, Some(FallbackReason::CircuitOpen));
        assert!(env.is_degraded());
    }

    #[test]
    fn test_serializes_source_lowercase() {
        let env = ResponseEnvelope::cached(Subject::TaskCreation, "Nice task.");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["source"], "cache");
        assert_eq!(json["subject"], "task_creation");
        assert!(json["metadata"].as_object().unwrap().is_empty());
    }
}
