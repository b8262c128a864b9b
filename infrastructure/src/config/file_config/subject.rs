//! Subject configuration from TOML (`[subjects.<name>]` sections)
//!
//! Every field is optional at this level so that a file can override a
//! single field of a built-in subject. Required fields and value ranges are
//! enforced when converting into domain types.

use cake_domain::{
    ApiKey, ConfigError, ContextTemplate, FallbackPool, FallbackPoolError, FallbackResponse,
    ModelConfig, ProviderKind, ResponseFormat, Subject, SubjectConfig,
};
use serde::{Deserialize, Serialize};

/// One model slot (`primary_model` / `fallback_model`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileModelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Name of the environment variable holding the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Name of the environment variable holding the API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Per-attempt timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<i64>,
    /// Seconds between attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<f64>,
}

/// One canned response (`[[subjects.<name>.fallback_responses]]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileFallbackResponse {
    pub text: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSubjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_model: Option<FileModelConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<FileModelConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_responses: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_duration_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_responses: Option<Vec<FileFallbackResponse>>,
}

impl FileSubjectConfig {
    /// Convert into a domain [`SubjectConfig`].
    ///
    /// `env` resolves environment variables (API keys and bases); pass
    /// `|name| std::env::var(name).ok()` in production.
    pub fn to_subject_config(
        &self,
        subject: Subject,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<SubjectConfig, ConfigError> {
        let name = subject.as_str();

        let primary = self
            .primary_model
            .as_ref()
            .ok_or_else(|| ConfigError::missing(name, "primary_model"))?
            .to_model_config(name, "primary_model", None, env)?;

        let fallback = match &self.fallback_model {
            Some(slot) => slot.to_model_config(name, "fallback_model", Some(ProviderKind::Fallback), env)?,
            None => ModelConfig::static_fallback(),
        };

        let system_prompt = required(name, "system_prompt", self.system_prompt.as_deref())?;
        let template_source = required(name, "context_template", self.context_template.as_deref())?;
        let context_template =
            ContextTemplate::parse(template_source).map_err(|e| ConfigError::InvalidTemplate {
                subject: name.to_string(),
                message: e.to_string(),
            })?;

        let response_format = match self.response_format.as_deref() {
            Some(value) => value.parse::<ResponseFormat>().map_err(|_| {
                ConfigError::invalid_enum(name, "response_format", value, ResponseFormat::VALID_VALUES)
            })?,
            None => ResponseFormat::default(),
        };

        let pool = self.fallback_pool(name)?;

        let mut config = SubjectConfig::new(subject, primary, system_prompt, context_template, pool)
            .with_response_format(response_format)
            .with_cache(
                self.cache_responses.unwrap_or(true),
                self.cache_duration_hours
                    .unwrap_or(SubjectConfig::DEFAULT_CACHE_DURATION_HOURS),
            );
        config.fallback_model = fallback;

        if let Some(max) = self.max_context_length {
            let max = usize::try_from(max)
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| ConfigError::out_of_range(name, "max_context_length", max, "> 0"))?;
            config = config.with_max_context_length(max);
        }

        config.validate()?;
        Ok(config)
    }

    fn fallback_pool(&self, name: &str) -> Result<FallbackPool, ConfigError> {
        let responses = self
            .fallback_responses
            .iter()
            .flatten()
            .map(FileFallbackResponse::to_fallback_response)
            .collect();

        FallbackPool::new(responses).map_err(|e| match e {
            FallbackPoolError::InvalidWeight { index, weight } => ConfigError::out_of_range(
                name,
                format!("fallback_responses[{index}].weight"),
                weight,
                ">= 0",
            ),
            FallbackPoolError::Empty | FallbackPoolError::ZeroTotalWeight => {
                ConfigError::EmptyFallbackPool {
                    subject: name.to_string(),
                }
            }
        })
    }
}

impl FileModelConfig {
    fn to_model_config(
        &self,
        subject: &str,
        slot: &str,
        default_provider: Option<ProviderKind>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<ModelConfig, ConfigError> {
        let field = |name: &str| format!("{slot}.{name}");

        let provider = match (self.provider.as_deref(), default_provider) {
            (Some(value), _) => value.parse::<ProviderKind>().map_err(|_| {
                ConfigError::invalid_enum(subject, field("provider"), value, ProviderKind::VALID_VALUES)
            })?,
            (None, Some(provider)) => provider,
            (None, None) => return Err(ConfigError::missing(subject, field("provider"))),
        };

        if provider == ProviderKind::Fallback {
            let mut model = ModelConfig::static_fallback();
            if let Some(name) = &self.model_name {
                model.model_name = name.clone();
            }
            if let Some(timeout) = self.timeout {
                model.timeout_seconds = positive_u64(subject, &field("timeout"), timeout)?;
            }
            return Ok(model);
        }

        let model_name = required(subject, &field("model_name"), self.model_name.as_deref())?;
        let mut model = ModelConfig::new(provider, model_name);

        if let Some(max_tokens) = self.max_tokens {
            model.max_tokens = u32::try_from(max_tokens)
                .ok()
                .filter(|t| *t > 0)
                .ok_or_else(|| ConfigError::out_of_range(subject, field("max_tokens"), max_tokens, "> 0"))?;
        }
        if let Some(temperature) = self.temperature {
            model.temperature = temperature;
        }
        if let Some(timeout) = self.timeout {
            model.timeout_seconds = positive_u64(subject, &field("timeout"), timeout)?;
        }
        if let Some(attempts) = self.retry_attempts {
            model.retry_attempts = u32::try_from(attempts)
                .map_err(|_| ConfigError::out_of_range(subject, field("retry_attempts"), attempts, ">= 0"))?;
        }
        if let Some(delay) = self.retry_delay {
            model.retry_delay_seconds = delay;
        }

        let key_env = self
            .api_key_env
            .clone()
            .or_else(|| default_api_key_env(provider).map(String::from));
        if let Some(key) = key_env.as_deref().and_then(env).filter(|k| !k.is_empty()) {
            model.api_key = Some(ApiKey::new(key));
        }

        let base_env = self
            .api_base_env
            .clone()
            .or_else(|| default_api_base_env(provider).map(String::from));
        model.api_base = self
            .api_base
            .clone()
            .or_else(|| base_env.as_deref().and_then(env))
            .filter(|b| !b.is_empty());

        model.validate(subject, slot)?;
        Ok(model)
    }
}

impl FileFallbackResponse {
    pub fn new(text: impl Into<String>, weight: f64) -> Self {
        Self {
            text: text.into(),
            weight,
            context_type: None,
            mood: None,
            animation: None,
        }
    }

    pub fn tagged(mut self, context_type: &str, mood: &str, animation: &str) -> Self {
        self.context_type = Some(context_type.to_string());
        self.mood = Some(mood.to_string());
        self.animation = Some(animation.to_string());
        self
    }

    fn to_fallback_response(&self) -> FallbackResponse {
        let mut response = FallbackResponse::new(self.text.clone(), self.weight);
        if let Some(context_type) = &self.context_type {
            response = response.with_context_type(context_type.clone());
        }
        if let Some(mood) = &self.mood {
            response = response.with_mood(mood.clone());
        }
        if let Some(animation) = &self.animation {
            response = response.with_animation(animation.clone());
        }
        response
    }
}

fn default_api_key_env(provider: ProviderKind) -> Option<&'static str> {
    match provider {
        ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
        ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
        ProviderKind::Local | ProviderKind::Fallback => None,
    }
}

fn default_api_base_env(provider: ProviderKind) -> Option<&'static str> {
    match provider {
        ProviderKind::OpenAi => Some("OPENAI_API_BASE"),
        _ => None,
    }
}

fn required<'a>(subject: &str, field: &str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::missing(subject, field))
}

fn positive_u64(subject: &str, field: &str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigError::out_of_range(subject, field, value, "> 0"))
}
