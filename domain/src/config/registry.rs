//! Subject configuration registry.
//!
//! The registry is built once from fully parsed [`SubjectConfig`]s, rejects
//! the whole set if any one of them is invalid, and is read-only afterwards.
//! It is passed to whoever needs it; there is no global instance.

use super::error::ConfigError;
use super::subject_config::SubjectConfig;
use crate::core::error::DomainError;
use crate::core::subject::Subject;
use std::collections::BTreeMap;

/// Validated, immutable set of subject configurations
#[derive(Debug, Clone, Default)]
pub struct SubjectRegistry {
    subjects: BTreeMap<Subject, SubjectConfig>,
}

impl SubjectRegistry {
    /// Validate every config eagerly and build the registry.
    ///
    /// Fails on the first invalid subject or on a subject configured twice.
    pub fn load(configs: impl IntoIterator<Item = SubjectConfig>) -> Result<Self, ConfigError> {
        let mut subjects = BTreeMap::new();
        for config in configs {
            config.validate()?;
            let subject = config.subject;
            if subjects.insert(subject, config).is_some() {
                return Err(ConfigError::DuplicateSubject(subject.to_string()));
            }
        }
        Ok(Self { subjects })
    }

    /// Look up a subject by its wire name.
    ///
    /// Both unparseable names and known-but-unconfigured subjects are
    /// reported as [`DomainError::UnknownSubject`].
    pub fn get(&self, name: &str) -> Result<&SubjectConfig, DomainError> {
        name.parse::<Subject>()
            .ok()
            .and_then(|subject| self.subjects.get(&subject))
            .ok_or_else(|| DomainError::UnknownSubject(name.to_string()))
    }

    pub fn get_subject(&self, subject: Subject) -> Option<&SubjectConfig> {
        self.subjects.get(&subject)
    }

    /// Configured subjects in stable order
    pub fn subjects(&self) -> impl Iterator<Item = Subject> + '_ {
        self.subjects.keys().copied()
    }

    pub fn configs(&self) -> impl Iterator<Item = &SubjectConfig> {
        self.subjects.values()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
