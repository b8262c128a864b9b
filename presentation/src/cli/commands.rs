//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for responses and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable output
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for cake-ai
#[derive(Parser, Debug)]
#[command(name = "cake-ai")]
#[command(author, version, about = "Subject-scoped AI responses with cache, circuit breaker and static fallback")]
#[command(long_about = r#"
cake-ai generates short, themed responses for a fixed set of subjects
(task_creation, motivation, celebration, ...). Every request is answered:
from the cache, from the primary model, or from the subject's weighted pool
of canned responses when the model is unreachable.

Configuration files are loaded from (in priority order):
1. --config <path>                  Explicit config file
2. ./cake-ai.toml                   Project-level config
3. ~/.config/cake-ai/config.toml    Global config
4. CAKE_AI_* environment variables
5. Built-in defaults

Example:
  cake-ai generate task_creation --var task_title="Write report" --var priority=high --var difficulty=hard
  cake-ai generate celebration --var achievement_type=streak --var achievement_details="7 days" --repeat 3
  cake-ai generate motivation --var streak=5 --force
  cake-ai connectivity
  cake-ai status --output json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append one JSON line per generation and breaker transition to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub generation_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Generate a response for a subject
    Generate {
        /// Subject name, e.g. task_creation
        subject: String,

        /// Template variable as key=value (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Issue the same request this many times (later ones hit the cache)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
        repeat: u32,

        /// Seed for fallback selection, for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the cache and ask the model again (the breaker still applies)
        #[arg(long)]
        force: bool,
    },

    /// Show circuit, attempt and cache status for every subject
    Status,

    /// Show the circuit breaker state of one subject
    Circuit {
        subject: String,
    },

    /// List configured subjects and their template variables
    Subjects,

    /// Send one request to every configured provider and report the results
    Connectivity,
}

/// Parse a `key=value` pair; the value may itself contain `=`
fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
