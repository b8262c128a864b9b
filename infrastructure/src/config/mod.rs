//! Configuration file loading for cake-ai
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./cake-ai.toml` or `./.cake-ai.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/cake-ai/config.toml`
//! 4. `CAKE_AI_*` environment variables
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileCircuitBreakerConfig, FileConfig, FileFallbackResponse, FileModelConfig, FileSubjectConfig,
};
pub use loader::ConfigLoader;
