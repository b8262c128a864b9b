//! CLI entrypoint for cake-ai
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use cake_application::{GenerationLogger, NoGenerationLogger, ResponseOrchestrator};
use cake_infrastructure::{
    ConfigLoader, FileConfig, InMemoryResponseCache, JsonlGenerationLogger, RoutingProvider,
};
use cake_presentation::{Cli, Command, formatter_for};
use clap::{CommandFactory, Parser};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let Some(command) = cli.command.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // === Configuration ===
    let file_config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    let registry = file_config
        .to_registry(&|name| std::env::var(name).ok())
        .context("invalid subject configuration")?;
    let settings = file_config
        .breaker_settings()
        .context("invalid circuit breaker configuration")?;

    info!(subjects = registry.len(), "Starting cake-ai");

    // === Dependency Injection ===
    let logger: Arc<dyn GenerationLogger> = match &cli.generation_log {
        Some(path) => match JsonlGenerationLogger::open(path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!("Generation log disabled: could not open {}", path.display());
                Arc::new(NoGenerationLogger)
            }
        },
        None => Arc::new(NoGenerationLogger),
    };

    let mut orchestrator = ResponseOrchestrator::with_logger(
        Arc::new(registry),
        Arc::new(RoutingProvider::with_http_adapters()),
        Arc::new(InMemoryResponseCache::new()),
        settings,
        logger,
    );

    let formatter = formatter_for(cli.output);

    match command {
        Command::Generate {
            subject,
            vars,
            repeat,
            seed,
            force,
        } => {
            if let Some(seed) = seed {
                orchestrator = orchestrator.with_rng(StdRng::seed_from_u64(seed));
            }
            let variables: HashMap<String, String> = vars.into_iter().collect();

            for _ in 0..repeat {
                let envelope = if force {
                    orchestrator.generate_forced(&subject, &variables).await?
                } else {
                    orchestrator.generate(&subject, &variables).await?
                };
                println!("{}", formatter.format_response(&envelope));
            }
        }
        Command::Status => {
            println!("{}", formatter.format_status(&orchestrator.status().await));
        }
        Command::Circuit { subject } => {
            let snapshot = orchestrator.circuit_state(&subject)?;
            let subject = orchestrator.registry().get(&subject)?.subject;
            println!("{}", formatter.format_circuit(subject, &snapshot));
        }
        Command::Subjects => {
            println!("{}", formatter.format_subjects(orchestrator.registry()));
        }
        Command::Connectivity => {
            let report = orchestrator.check_connectivity().await;
            println!("{}", formatter.format_connectivity(&report));
        }
    }

    Ok(())
}
