//! Subject configuration for the domain layer
//!
//! These types describe how each subject talks to its models. They are
//! assembled by the infrastructure loader and validated here.

mod error;
mod model_config;
mod registry;
mod response_format;
mod subject_config;

pub use error::ConfigError;
pub use model_config::{ApiKey, ModelConfig, ProviderKind};
pub use registry::SubjectRegistry;
pub use response_format::ResponseFormat;
pub use subject_config::SubjectConfig;
