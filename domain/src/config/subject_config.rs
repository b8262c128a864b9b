//! Per-subject configuration

use super::error::ConfigError;
use super::model_config::{ModelConfig, ProviderKind};
use super::response_format::ResponseFormat;
use crate::core::error::DomainError;
use crate::core::subject::Subject;
use crate::fallback::FallbackPool;
use crate::prompt::{ContextTemplate, truncate_context};
use std::collections::HashMap;
use std::time::Duration;

/// Everything needed to answer requests for one subject.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SubjectConfig {
    pub subject: Subject,
    pub primary_model: ModelConfig,
    /// Always the static pool (`provider = "fallback"`)
    pub fallback_model: ModelConfig,
    pub system_prompt: String,
    pub context_template: ContextTemplate,
    pub response_format: ResponseFormat,
    pub cache_enabled: bool,
    pub cache_duration_hours: f64,
    /// Rendered context is cut to this many bytes before use
    pub max_context_length: usize,
    pub fallback_responses: FallbackPool,
}

impl SubjectConfig {
    pub const DEFAULT_CACHE_DURATION_HOURS: f64 = 24.0;
    pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 1000;
    /// Ten years
    pub const MAX_CACHE_DURATION_HOURS: f64 = 87_600.0;

    pub fn new(
        subject: Subject,
        primary_model: ModelConfig,
        system_prompt: impl Into<String>,
        context_template: ContextTemplate,
        fallback_responses: FallbackPool,
    ) -> Self {
        Self {
            subject,
            primary_model,
            fallback_model: ModelConfig::static_fallback(),
            system_prompt: system_prompt.into(),
            context_template,
            response_format: ResponseFormat::default(),
            cache_enabled: true,
            cache_duration_hours: Self::DEFAULT_CACHE_DURATION_HOURS,
            max_context_length: Self::DEFAULT_MAX_CONTEXT_LENGTH,
            fallback_responses,
        }
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn with_cache(mut self, enabled: bool, duration_hours: f64) -> Self {
        self.cache_enabled = enabled;
        self.cache_duration_hours = duration_hours;
        self
    }

    pub fn with_max_context_length(mut self, max: usize) -> Self {
        self.max_context_length = max;
        self
    }

    /// How long a cached response for this subject stays servable
    pub fn cache_ttl(&self) -> Duration {
        Duration::try_from_secs_f64(self.cache_duration_hours.max(0.0) * 3600.0).unwrap_or(Duration::ZERO)
    }

    /// Render the context template and cut it to `max_context_length` bytes.
    ///
    /// The result feeds both the cache key and the provider request, so it
    /// must stay deterministic for identical variables.
    pub fn render_context(&self, variables: &HashMap<String, String>) -> Result<String, DomainError> {
        let rendered = self.context_template.render(variables)?;
        Ok(truncate_context(&rendered, self.max_context_length).to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.subject.as_str();

        self.primary_model.validate(name, "primary_model")?;
        if !self.primary_model.provider.is_live() {
            return Err(ConfigError::invalid_enum(
                name,
                "primary_model.provider",
                self.primary_model.provider.as_str(),
                &["openai", "anthropic", "local"],
            ));
        }

        self.fallback_model.validate(name, "fallback_model")?;
        if self.fallback_model.provider != ProviderKind::Fallback {
            return Err(ConfigError::invalid_enum(
                name,
                "fallback_model.provider",
                self.fallback_model.provider.as_str(),
                &["fallback"],
            ));
        }

        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::missing(name, "system_prompt"));
        }
        if self.context_template.is_empty() {
            return Err(ConfigError::missing(name, "context_template"));
        }
        if !self.cache_duration_hours.is_finite() || self.cache_duration_hours < 0.0 {
            return Err(ConfigError::out_of_range(
                name,
                "cache_duration_hours",
                self.cache_duration_hours,
                ">= 0",
            ));
        }
        if self.cache_duration_hours > Self::MAX_CACHE_DURATION_HOURS {
            return Err(ConfigError::out_of_range(
                name,
                "cache_duration_hours",
                self.cache_duration_hours,
                "<= 87600",
            ));
        }
        if self.max_context_length == 0 {
            return Err(ConfigError::out_of_range(name, "max_context_length", 0, "> 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::FallbackResponse;

    fn config() -> SubjectConfig {
        SubjectConfig::new(
            Subject::Motivation,
            ModelConfig::new(ProviderKind::OpenAi, "gpt-3.5-turbo"),
            "You are a supportive assistant.",
            ContextTemplate::parse("Current streak: {streak}").unwrap(),
            FallbackPool::new(vec![FallbackResponse::new("Keep going!", 1.0)]).unwrap(),
        )
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
        assert_eq!(config().cache_ttl(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_fallback_slot_must_be_static() {
        let mut config = config();
        config.fallback_model = ModelConfig::new(ProviderKind::Anthropic, "claude");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnumValue { ref field, .. } if field == "fallback_model.provider"));
    }

    #[test]
    fn test_primary_slot_must_be_live() {
        let mut config = config();
        config.primary_model = ModelConfig::static_fallback();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_cache_duration_rejected() {
        let config = config().with_cache(true, -1.0);
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_zero_cache_duration_allowed() {
        let config = config().with_cache(true, 0.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_oversized_cache_duration_rejected() {
        let config = config().with_cache(true, 1e300);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { ref field, .. } if field == "cache_duration_hours"));
        assert!(self::config().with_cache(true, 87_600.0).validate().is_ok());
    }

    #[test]
    fn test_render_context_truncates() {
        let config = config().with_max_context_length(18);
        let vars = HashMap::from([("streak".to_string(), "12 days".to_string())]);
        assert_eq!(config.render_context(&vars).unwrap(), "Current streak: 12");
    }

    #[test]
    fn test_render_context_missing_variable() {
        let err = config().render_context(&HashMap::new()).unwrap_err();
        assert_eq!(err, DomainError::MissingVariables(vec!["streak".to_string()]));
    }

    #[test]
    fn test_blank_system_prompt_rejected() {
        let mut config = config();
        config.system_prompt = "   ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::missing("motivation", "system_prompt"))
        );
    }
}
