//! Circuit breaker configuration from TOML (`[circuit_breaker]` section)

use cake_application::BreakerSettings;
use cake_domain::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileCircuitBreakerConfig {
    /// Consecutive failed attempts that open the breaker (default: 3)
    pub failure_threshold: i64,
    /// Fixed cool-down for every subject; derived from retry settings when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_seconds: Option<f64>,
    /// Cool-down used when a subject's retry settings give zero (default: 300)
    pub baseline_cooldown_seconds: f64,
}

impl Default for FileCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: i64::from(BreakerSettings::DEFAULT_FAILURE_THRESHOLD),
            cooldown_seconds: None,
            baseline_cooldown_seconds: BreakerSettings::DEFAULT_BASELINE_COOLDOWN_SECS as f64,
        }
    }
}

impl FileCircuitBreakerConfig {
    const SECTION: &'static str = "circuit_breaker";

    pub fn to_settings(&self) -> Result<BreakerSettings, ConfigError> {
        let threshold = u32::try_from(self.failure_threshold)
            .ok()
            .filter(|t| *t > 0)
            .ok_or_else(|| {
                ConfigError::out_of_range(Self::SECTION, "failure_threshold", self.failure_threshold, "> 0")
            })?;

        let baseline = seconds(self.baseline_cooldown_seconds).ok_or_else(|| {
            ConfigError::out_of_range(
                Self::SECTION,
                "baseline_cooldown_seconds",
                self.baseline_cooldown_seconds,
                ">= 0",
            )
        })?;

        let mut settings = BreakerSettings::default()
            .with_failure_threshold(threshold)
            .with_baseline_cooldown(baseline);

        if let Some(value) = self.cooldown_seconds {
            let cooldown = seconds(value).ok_or_else(|| {
                ConfigError::out_of_range(Self::SECTION, "cooldown_seconds", value, ">= 0")
            })?;
            settings = settings.with_cooldown(cooldown);
        }
        Ok(settings)
    }
}

fn seconds(value: f64) -> Option<Duration> {
    if value.is_finite() && value >= 0.0 {
        Duration::try_from_secs_f64(value).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_convert() {
        let settings = FileCircuitBreakerConfig::default().to_settings().unwrap();
        assert_eq!(settings, BreakerSettings::default());
    }

    #[test]
    fn test_explicit_cooldown() {
        let config: FileCircuitBreakerConfig =
            toml::from_str("failure_threshold = 5\ncooldown_seconds = 30").unwrap();
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.failure_threshold, 5);
        assert_eq!(settings.cooldown, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = FileCircuitBreakerConfig {
            failure_threshold: 0,
            ..Default::default()
        };
        assert!(matches!(config.to_settings(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let config = FileCircuitBreakerConfig {
            cooldown_seconds: Some(-1.0),
            ..Default::default()
        };
        assert!(config.to_settings().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<FileCircuitBreakerConfig, _> = toml::from_str("threshold = 3");
        assert!(result.is_err());
    }
}
