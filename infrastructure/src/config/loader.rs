//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "cake-ai";
const ENV_PREFIX: &str = "CAKE_AI_";
const PROJECT_FILES: [&str; 2] = ["cake-ai.toml", ".cake-ai.toml"];
/// Top-level sections an environment variable may target
const ENV_SECTIONS: [&str; 2] = ["subjects__", "circuit_breaker__"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./cake-ai.toml` or `./.cake-ai.toml`
    /// 3. XDG config: `$XDG_CONFIG_HOME/cake-ai/config.toml`
    /// 4. `CAKE_AI_*` environment variables (`__` separates nested keys)
    /// 5. Built-in defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();
        Self::figment(global.as_deref(), project.as_deref(), config_path.map(PathBuf::as_path))
            .extract()
            .map_err(Box::new)
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .filter(|key| is_config_key(key.as_str()))
                    .split("__"),
            );

        for path in [global, project, explicit].into_iter().flatten() {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/cake-ai/config.toml if set,
    /// otherwise falls back to ~/.config/cake-ai/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES.iter().map(PathBuf::from).find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{mark:^7}] Explicit: {}", path.display());
        }

        match Self::project_config_path() {
            Some(path) => println!("  [ FOUND ] Project:  {}", path.display()),
            None => println!("  [       ] Project:  ./cake-ai.toml or ./.cake-ai.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "" };
            println!("  [{mark:^7}] Global:   {}", path.display());
        }

        println!("  [       ] Env:      {ENV_PREFIX}* (nested keys split on __)");
        println!("  [       ] Default:  built-in defaults");
    }
}

/// Whether a prefix-stripped variable name belongs to the config file.
///
/// Other `CAKE_AI_*` variables (log level, API keys) are left alone so they
/// never trip `deny_unknown_fields`.
fn is_config_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS.iter().any(|section| key.starts_with(section))
}
