//! Output formatter trait

use crate::cli::commands::OutputFormat;
use cake_application::{ConnectivityReport, OrchestratorStatus};
use cake_domain::{CircuitSnapshot, ResponseEnvelope, Subject, SubjectRegistry};

/// Trait for rendering orchestrator results
pub trait OutputFormatter {
    fn format_response(&self, envelope: &ResponseEnvelope) -> String;

    fn format_status(&self, status: &OrchestratorStatus) -> String;

    fn format_circuit(&self, subject: Subject, snapshot: &CircuitSnapshot) -> String;

    fn format_subjects(&self, registry: &SubjectRegistry) -> String;

    fn format_connectivity(&self, report: &ConnectivityReport) -> String;
}

/// Formatter for the selected output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(super::console::ConsoleFormatter),
        OutputFormat::Json => Box::new(super::json::JsonFormatter),
    }
}
