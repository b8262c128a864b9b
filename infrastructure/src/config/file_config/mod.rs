//! Raw TOML configuration data types
//!
//! These structs mirror the config file. Built-in subjects live in
//! [`FileConfig::default`], and files merged on top only need to name the
//! fields they change.

mod circuit_breaker;
mod defaults;
mod subject;

pub use circuit_breaker::FileCircuitBreakerConfig;
pub use subject::{FileFallbackResponse, FileModelConfig, FileSubjectConfig};

use cake_application::BreakerSettings;
use cake_domain::{ConfigError, Subject, SubjectRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Per-subject settings keyed by subject wire name
    pub subjects: BTreeMap<String, FileSubjectConfig>,
    /// Connectivity breaker settings shared by all subjects
    pub circuit_breaker: FileCircuitBreakerConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            subjects: defaults::default_subjects(),
            circuit_breaker: FileCircuitBreakerConfig::default(),
        }
    }
}

impl FileConfig {
    /// An empty configuration with no subjects at all
    pub fn empty() -> Self {
        Self {
            subjects: BTreeMap::new(),
            circuit_breaker: FileCircuitBreakerConfig::default(),
        }
    }

    /// Validate every subject and build the registry.
    ///
    /// Any error rejects the whole configuration.
    pub fn to_registry(&self, env: &dyn Fn(&str) -> Option<String>) -> Result<SubjectRegistry, ConfigError> {
        let mut configs = Vec::with_capacity(self.subjects.len());
        for (name, file_subject) in &self.subjects {
            let subject = name
                .parse::<Subject>()
                .map_err(|_| ConfigError::UnknownSubject(name.clone()))?;
            configs.push(file_subject.to_subject_config(subject, env)?);
        }
        SubjectRegistry::load(configs)
    }

    pub fn breaker_settings(&self) -> Result<BreakerSettings, ConfigError> {
        self.circuit_breaker.to_settings()
    }
}
