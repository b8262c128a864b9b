//! Circuit breaker settings.
//!
//! [`BreakerSettings`] controls when a subject's breaker trips and how long
//! it stays open before a probe is allowed through.

use cake_domain::ModelConfig;
use std::time::Duration;

/// Circuit breaker tuning, shared by every subject.
///
/// The cool-down for a subject is resolved once at startup:
///
/// 1. `cooldown` when set explicitly
/// 2. otherwise `retry_delay × retry_attempts` of the subject's primary model
/// 3. otherwise (that product is zero) `baseline_cooldown`
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerSettings {
    /// Consecutive failed attempts that trip a closed breaker.
    pub failure_threshold: u32,
    /// Fixed cool-down for every subject, overriding the derived one.
    pub cooldown: Option<Duration>,
    /// Used when a subject's retry settings give a zero cool-down.
    pub baseline_cooldown: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: Self::DEFAULT_FAILURE_THRESHOLD,
            cooldown: None,
            baseline_cooldown: Duration::from_secs(Self::DEFAULT_BASELINE_COOLDOWN_SECS),
        }
    }
}

impl BreakerSettings {
    pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
    pub const DEFAULT_BASELINE_COOLDOWN_SECS: u64 = 300;

    // ==================== Builder Methods ====================

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn with_baseline_cooldown(mut self, cooldown: Duration) -> Self {
        self.baseline_cooldown = cooldown;
        self
    }

    // ==================== Resolution ====================

    pub fn cooldown_for(&self, primary: &ModelConfig) -> Duration {
        if let Some(cooldown) = self.cooldown {
            return cooldown;
        }
        let product = primary.retry_delay_seconds * f64::from(primary.retry_attempts);
        match Duration::try_from_secs_f64(product) {
            Ok(derived) if !derived.is_zero() => derived,
            _ => self.baseline_cooldown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cake_domain::ProviderKind;

    fn model(attempts: u32, delay: f64) -> ModelConfig {
        ModelConfig::new(ProviderKind::OpenAi, "gpt-3.5-turbo").with_retry(attempts, delay)
    }

    #[test]
    fn test_defaults() {
        let settings = BreakerSettings::default();
        assert_eq!(settings.failure_threshold, 3);
        assert_eq!(settings.cooldown, None);
        assert_eq!(settings.baseline_cooldown, Duration::from_secs(300));
    }

    #[test]
    fn test_cooldown_derived_from_retry_settings() {
        let settings = BreakerSettings::default();
        assert_eq!(settings.cooldown_for(&model(3, 1.0)), Duration::from_secs(3));
        assert_eq!(settings.cooldown_for(&model(2, 2.5)), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_retry_falls_back_to_baseline() {
        let settings = BreakerSettings::default().with_baseline_cooldown(Duration::from_secs(60));
        assert_eq!(settings.cooldown_for(&model(0, 1.0)), Duration::from_secs(60));
        assert_eq!(settings.cooldown_for(&model(3, 0.0)), Duration::from_secs(60));
    }

    #[test]
    fn test_unrepresentable_product_falls_back_to_baseline() {
        let settings = BreakerSettings::default();
        assert_eq!(settings.cooldown_for(&model(100, 1e18)), Duration::from_secs(300));
        assert_eq!(settings.cooldown_for(&model(2, f64::NAN)), Duration::from_secs(300));
    }

    #[test]
    fn test_explicit_cooldown_wins() {
        let settings = BreakerSettings::default().with_cooldown(Duration::from_secs(30));
        assert_eq!(settings.cooldown_for(&model(3, 1.0)), Duration::from_secs(30));
    }

    #[test]
    fn test_threshold_never_zero() {
        assert_eq!(BreakerSettings::default().with_failure_threshold(0).failure_threshold, 1);
    }
}
