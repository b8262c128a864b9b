//! Model configuration for a single provider slot.
//!
//! Each subject has two slots: a primary model that is called live and a
//! fallback slot that always points at the static response pool.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider backing a model slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions API
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// OpenAI-compatible endpoint at `api_base` (no key required)
    Local,
    /// The static canned-response pool
    Fallback,
}

impl ProviderKind {
    pub const VALID_VALUES: &'static [&'static str] = &["openai", "anthropic", "local", "fallback"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Local => "local",
            ProviderKind::Fallback => "fallback",
        }
    }

    /// Whether this provider is a live model backend
    pub fn is_live(&self) -> bool {
        !matches!(self, ProviderKind::Fallback)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "local" => Ok(ProviderKind::Local),
            "fallback" => Ok(ProviderKind::Fallback),
            other => Err(other.to_string()),
        }
    }
}

/// A provider API key resolved from the environment.
///
/// Formatting never reveals the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Configuration for one model slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model_name: String,
    pub api_key: Option<ApiKey>,
    pub api_base: Option<String>,
    pub max_tokens: u32,
    /// Sampling temperature, `0.0..=2.0`
    pub temperature: f64,
    /// Per-attempt timeout in seconds (> 0)
    pub timeout_seconds: u64,
    /// Additional attempts after the first one fails
    pub retry_attempts: u32,
    /// Fixed wait between attempts
    pub retry_delay_seconds: f64,
}

impl ModelConfig {
    pub const DEFAULT_MAX_TOKENS: u32 = 150;
    pub const DEFAULT_TEMPERATURE: f64 = 0.7;
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
    pub const DEFAULT_RETRY_DELAY_SECONDS: f64 = 1.0;
    pub const MAX_RETRY_DELAY_SECONDS: f64 = 3600.0;
    pub const MAX_RETRY_ATTEMPTS: u32 = 100;

    /// A live model slot with default limits
    pub fn new(provider: ProviderKind, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            api_key: None,
            api_base: None,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            temperature: Self::DEFAULT_TEMPERATURE,
            timeout_seconds: Self::DEFAULT_TIMEOUT_SECONDS,
            retry_attempts: Self::DEFAULT_RETRY_ATTEMPTS,
            retry_delay_seconds: Self::DEFAULT_RETRY_DELAY_SECONDS,
        }
    }

    /// The fallback slot pointing at the static response pool
    pub fn static_fallback() -> Self {
        Self {
            timeout_seconds: 1,
            retry_attempts: 0,
            retry_delay_seconds: 0.0,
            ..Self::new(ProviderKind::Fallback, "static_responses")
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay_seconds: f64) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay_seconds = delay_seconds;
        self
    }

    // ==================== Accessors ====================

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.retry_delay_seconds.max(0.0)).unwrap_or(Duration::ZERO)
    }

    /// Total attempts a request may make: the first plus the retries
    pub fn max_attempts(&self) -> u32 {
        self.retry_attempts.saturating_add(1)
    }

    /// Validate value ranges; `slot` prefixes field names in errors.
    pub fn validate(&self, subject: &str, slot: &str) -> Result<(), ConfigError> {
        let field = |name: &str| format!("{slot}.{name}");

        if self.model_name.trim().is_empty() {
            return Err(ConfigError::missing(subject, field("model_name")));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::out_of_range(subject, field("max_tokens"), self.max_tokens, "> 0"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::out_of_range(
                subject,
                field("temperature"),
                self.temperature,
                "0.0..=2.0",
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::out_of_range(subject, field("timeout"), self.timeout_seconds, "> 0"));
        }
        if !self.retry_delay_seconds.is_finite() || self.retry_delay_seconds < 0.0 {
            return Err(ConfigError::out_of_range(
                subject,
                field("retry_delay"),
                self.retry_delay_seconds,
                ">= 0",
            ));
        }
        if self.retry_delay_seconds > Self::MAX_RETRY_DELAY_SECONDS {
            return Err(ConfigError::out_of_range(
                subject,
                field("retry_delay"),
                self.retry_delay_seconds,
                "<= 3600",
            ));
        }
        if self.retry_attempts > Self::MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::out_of_range(
                subject,
                field("retry_attempts"),
                self.retry_attempts,
                "<= 100",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_redacted() {
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt-3.5-turbo")
            .with_api_key(ApiKey::new("sk-secret"));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("ApiKey(***)"));
        assert_eq!(config.api_key.unwrap().expose(), "sk-secret");
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("fallback".parse::<ProviderKind>(), Ok(ProviderKind::Fallback));
        assert!("cohere".parse::<ProviderKind>().is_err());
        assert!(!ProviderKind::Fallback.is_live());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt-3.5-turbo");
        assert!(config.validate("motivation", "primary_model").is_ok());
        assert!(ModelConfig::static_fallback().validate("motivation", "fallback_model").is_ok());
    }

    #[test]
    fn test_validate_rejects_temperature_out_of_range() {
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_temperature(2.1);
        let err = config.validate("motivation", "primary_model").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { ref field, .. } if field == "primary_model.temperature"));

        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_temperature(f64::NAN);
        assert!(config.validate("motivation", "primary_model").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_tokens() {
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_timeout_seconds(0);
        assert!(config.validate("s", "primary_model").is_err());
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_max_tokens(0);
        assert!(config.validate("s", "primary_model").is_err());
    }

    #[test]
    fn test_validate_rejects_negative_delay() {
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_retry(2, -0.5);
        assert!(config.validate("s", "primary_model").is_err());
    }

    #[test]
    fn test_validate_bounds_retry_settings() {
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_retry(3, 1e18);
        let err = config.validate("s", "primary_model").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { ref field, .. } if field == "primary_model.retry_delay"));

        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_retry(101, 1.0);
        let err = config.validate("s", "primary_model").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { ref field, .. } if field == "primary_model.retry_attempts"));

        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_retry(100, 3600.0);
        assert!(config.validate("s", "primary_model").is_ok());
    }

    #[test]
    fn test_max_attempts_includes_first_try() {
        let config = ModelConfig::new(ProviderKind::OpenAi, "gpt").with_retry(3, 1.0);
        assert_eq!(config.max_attempts(), 4);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
    }
}
