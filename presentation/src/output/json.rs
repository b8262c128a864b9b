//! JSON output for scripting

use crate::output::formatter::OutputFormatter;
use cake_application::{ConnectivityReport, OrchestratorStatus};
use cake_domain::{CircuitSnapshot, ResponseEnvelope, Subject, SubjectRegistry};
use serde_json::{Value, json};

pub struct JsonFormatter;

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

impl OutputFormatter for JsonFormatter {
    fn format_response(&self, envelope: &ResponseEnvelope) -> String {
        pretty(envelope)
    }

    fn format_status(&self, status: &OrchestratorStatus) -> String {
        pretty(status)
    }

    fn format_circuit(&self, subject: Subject, snapshot: &CircuitSnapshot) -> String {
        pretty(&json!({
            "subject": subject,
            "status": snapshot.status,
            "consecutive_failures": snapshot.consecutive_failures,
        }))
    }

    fn format_subjects(&self, registry: &SubjectRegistry) -> String {
        let subjects: Vec<Value> = registry
            .configs()
            .map(|config| {
                json!({
                    "subject": config.subject,
                    "provider": config.primary_model.provider,
                    "model": config.primary_model.model_name,
                    "variables": config.context_template.placeholders(),
                    "response_format": config.response_format,
                    "cache_enabled": config.cache_enabled,
                    "fallback_pool_size": config.fallback_responses.len(),
                })
            })
            .collect();
        pretty(&subjects)
    }

    fn format_connectivity(&self, report: &ConnectivityReport) -> String {
        pretty(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cake_domain::{CircuitStatus, FallbackResponse, ResponseMetadata};

    #[test]
    fn test_response_round_trips_as_json() {
        let envelope = ResponseEnvelope::primary(
            Subject::Motivation,
            "Keep going!",
            ResponseMetadata {
                model: Some("gpt-3.5-turbo".to_string()),
                provider: Some("openai".to_string()),
                tokens_used: Some(12),
                fallback_reason: None,
            },
        );
        let value: Value = serde_json::from_str(&JsonFormatter.format_response(&envelope)).unwrap();
        assert_eq!(value["text"], "Keep going!");
        assert_eq!(value["source"], "primary");
        assert_eq!(value["subject"], "motivation");
        assert_eq!(value["metadata"]["tokens_used"], 12);
        assert!(value["metadata"].get("fallback_reason").is_none());
    }

    #[test]
    fn test_fallback_reason_serialized() {
        let envelope = ResponseEnvelope::fallback(
            Subject::Encouragement,
            &FallbackResponse::new("Try again!", 1.0),
            cake_domain::FallbackReason::CircuitOpen,
        );
        let value: Value = serde_json::from_str(&JsonFormatter.format_response(&envelope)).unwrap();
        assert_eq!(value["source"], "fallback");
        assert_eq!(value["metadata"]["fallback_reason"], "circuit_open");
    }

    #[test]
    fn test_circuit_json() {
        let snapshot = CircuitSnapshot {
            status: CircuitStatus::HalfOpen,
            consecutive_failures: 3,
        };
        let value: Value =
            serde_json::from_str(&JsonFormatter.format_circuit(Subject::Celebration, &snapshot)).unwrap();
        assert_eq!(value["subject"], "celebration");
        assert_eq!(value["status"], "half_open");
        assert_eq!(value["consecutive_failures"], 3);
    }

    #[test]
    fn test_connectivity_json() {
        use cake_application::{ConnectivityStatus, ProviderConnectivity};
        use cake_domain::ProviderKind;

        let report = ConnectivityReport {
            providers: vec![ProviderConnectivity {
                provider: ProviderKind::OpenAi,
                model: "gpt-3.5-turbo".to_string(),
                status: ConnectivityStatus::Disconnected,
                response_time_ms: 812,
                error: Some("Connection error: refused".to_string()),
                subjects: vec![Subject::Motivation],
            }],
        };
        let value: Value = serde_json::from_str(&JsonFormatter.format_connectivity(&report)).unwrap();
        let provider = &value["providers"][0];
        assert_eq!(provider["provider"], "openai");
        assert_eq!(provider["status"], "disconnected");
        assert_eq!(provider["response_time_ms"], 812);
        assert_eq!(provider["subjects"][0], "motivation");
    }
}
