//! Console output formatter

use crate::output::formatter::OutputFormatter;
use cake_application::{
    ConnectivityReport, ConnectivityStatus, OrchestratorStatus, ProviderConnectivity, SubjectStatus,
};
use cake_domain::{CircuitSnapshot, CircuitStatus, ResponseEnvelope, ResponseSource, Subject, SubjectRegistry};
use colored::{ColoredString, Colorize};

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_response(envelope: &ResponseEnvelope) -> String {
        let mut output = String::new();
        output.push_str(&envelope.text);
        output.push('\n');

        let mut details = vec![
            format!("{} {}", "source:".dimmed(), Self::source(envelope.source)),
            format!("{} {}", "subject:".dimmed(), envelope.subject),
            format!("{} {}/{}", "mood:".dimmed(), envelope.mood, envelope.animation),
        ];

        let meta = &envelope.metadata;
        if let (Some(provider), Some(model)) = (&meta.provider, &meta.model) {
            details.push(format!("{} {provider}/{model}", "model:".dimmed()));
        }
        if let Some(tokens) = meta.tokens_used {
            details.push(format!("{} {tokens}", "tokens:".dimmed()));
        }
        if let Some(reason) = meta.fallback_reason {
            details.push(format!("{} {}", "reason:".dimmed(), reason.as_str().yellow()));
        }

        output.push_str(&format!("  {}\n", details.join("  ")));
        output
    }

    pub fn format_status(status: &OrchestratorStatus) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Subject Status"));
        output.push('\n');

        for subject in &status.subjects {
            output.push_str(&Self::subject_status(subject));
        }

        let cache = match status.cache_entries {
            Some(n) => n.to_string(),
            None => "unavailable".red().to_string(),
        };
        output.push_str(&format!("\n{} {}\n", "Cache entries:".cyan().bold(), cache));
        output.push_str(&Self::footer());
        output
    }

    pub fn format_circuit(subject: Subject, snapshot: &CircuitSnapshot) -> String {
        format!(
            "{} {} ({} consecutive failures)\n",
            format!("{subject}:").bold(),
            Self::circuit(snapshot.status),
            snapshot.consecutive_failures
        )
    }

    pub fn format_subjects(registry: &SubjectRegistry) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("Configured Subjects"));

        for config in registry.configs() {
            output.push_str(&format!(
                "\n{}\n",
                format!("── {} ──", config.subject).yellow().bold()
            ));
            output.push_str(&format!(
                "  {} {}/{}\n",
                "model:".dimmed(),
                config.primary_model.provider,
                config.primary_model.model_name
            ));

            let vars = config.context_template.placeholders();
            let vars = if vars.is_empty() {
                "(none)".to_string()
            } else {
                vars.join(", ")
            };
            output.push_str(&format!("  {} {}\n", "variables:".dimmed(), vars));
            output.push_str(&format!(
                "  {} {} responses, cache {}\n",
                "fallback:".dimmed(),
                config.fallback_responses.len(),
                if config.cache_enabled { "on" } else { "off" }
            ));
        }
        output
    }

    pub fn format_connectivity(report: &ConnectivityReport) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Provider Connectivity"));
        output.push('\n');
        for provider in &report.providers {
            output.push_str(&Self::provider_connectivity(provider));
        }
        output.push_str(&Self::footer());
        output
    }

    fn provider_connectivity(provider: &ProviderConnectivity) -> String {
        let status = match provider.status {
            ConnectivityStatus::Connected => provider.status.as_str().green(),
            ConnectivityStatus::AlwaysAvailable => provider.status.as_str().cyan(),
            ConnectivityStatus::Disconnected => provider.status.as_str().red().bold(),
        };
        let subjects: Vec<&str> = provider.subjects.iter().map(|s| s.as_str()).collect();
        let mut line = format!(
            "  {:<10} {} ({}ms) {} {}\n",
            provider.provider.as_str(),
            status,
            provider.response_time_ms,
            "model:".dimmed(),
            provider.model
        );
        if let Some(error) = &provider.error {
            line.push_str(&format!("    {} {}\n", "error:".dimmed(), error.red()));
        }
        line.push_str(&format!("    {} {}\n", "subjects:".dimmed(), subjects.join(", ")));
        line
    }

    fn subject_status(status: &SubjectStatus) -> String {
        let latency = status
            .attempts
            .last_latency_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "-".to_string());

        format!(
            "\n{}\n  {} {} ({} failures, cool-down {:.0}s)\n  {} {} total, {} failed, last {}\n  {} {}/{}, {} fallback responses, cache {}\n",
            format!("── {} ──", status.subject).yellow().bold(),
            "circuit:".dimmed(),
            Self::circuit(status.circuit.status),
            status.circuit.consecutive_failures,
            status.cooldown_seconds,
            "attempts:".dimmed(),
            status.attempts.total_attempts,
            status.attempts.failed_attempts,
            latency,
            "model:".dimmed(),
            status.provider,
            status.model,
            status.fallback_pool_size,
            if status.cache_enabled { "on" } else { "off" }
        )
    }

    fn circuit(status: CircuitStatus) -> ColoredString {
        match status {
            CircuitStatus::Closed => status.as_str().green(),
            CircuitStatus::HalfOpen => status.as_str().yellow(),
            CircuitStatus::Open => status.as_str().red().bold(),
        }
    }

    fn source(source: ResponseSource) -> ColoredString {
        match source {
            ResponseSource::Primary => source.as_str().green(),
            ResponseSource::Cache => source.as_str().cyan(),
            ResponseSource::Fallback => source.as_str().yellow(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_response(&self, envelope: &ResponseEnvelope) -> String {
        Self::format_response(envelope)
    }

    fn format_status(&self, status: &OrchestratorStatus) -> String {
        Self::format_status(status)
    }

    fn format_circuit(&self, subject: Subject, snapshot: &CircuitSnapshot) -> String {
        Self::format_circuit(subject, snapshot)
    }

    fn format_subjects(&self, registry: &SubjectRegistry) -> String {
        Self::format_subjects(registry)
    }

    fn format_connectivity(&self, report: &ConnectivityReport) -> String {
        Self::format_connectivity(report)
    }
}
