//! JSONL file writer for generation events.
//!
//! Each [`GenerationEvent`] becomes one JSON line carrying its `type` and an
//! RFC 3339 `timestamp`. The file is opened for append, so one log can span
//! several runs.

use cake_application::{GenerationEvent, GenerationLogger};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

pub struct JsonlGenerationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlGenerationLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened; generation works the
    /// same without an audit trail.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create generation log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open generation log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Merge `type` and `timestamp` into an object payload, or wrap anything else
fn record(event: GenerationEvent, at: DateTime<Utc>) -> Value {
    let timestamp = Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true));
    let event_type = Value::String(event.event_type.to_string());

    let mut map = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("type".to_string(), event_type);
    map.insert("timestamp".to_string(), timestamp);
    Value::Object(map)
}

impl GenerationLogger for JsonlGenerationLogger {
    fn log(&self, event: GenerationEvent) {
        let Ok(line) = serde_json::to_string(&record(event, Utc::now())) else {
            return;
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            warn!("Failed to write generation log {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlGenerationLogger {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_record_merges_type_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let value = record(
            GenerationEvent::new(
                "generation",
                json!({ "subject": "motivation", "source": "fallback", "attempts": 4 }),
            ),
            at,
        );
        assert_eq!(value["type"], "generation");
        assert_eq!(value["timestamp"], "2026-03-01T12:00:00.000Z");
        assert_eq!(value["subject"], "motivation");
        assert_eq!(value["attempts"], 4);
    }

    #[test]
    fn test_record_wraps_non_object_payload() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let value = record(GenerationEvent::new("note", json!("just a string")), at);
        assert_eq!(value["type"], "note");
        assert_eq!(value["data"], "just a string");
    }

    #[test]
    fn test_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("generation.jsonl");
        let logger = JsonlGenerationLogger::open(&path).unwrap();
        assert_eq!(logger.path(), path.as_path());

        logger.log(GenerationEvent::new(
            "generation",
            json!({ "subject": "celebration", "source": "primary", "latency_ms": 120 }),
        ));
        logger.log(GenerationEvent::new(
            "circuit_transition",
            json!({ "subject": "celebration", "from": "closed", "to": "open" }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "generation");
        assert_eq!(lines[0]["latency_ms"], 120);
        assert_eq!(lines[1]["type"], "circuit_transition");
        assert_eq!(lines[1]["to"], "open");
        assert!(lines.iter().all(|l| l["timestamp"].is_string()));
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generation.jsonl");

        for run in 0..2 {
            let logger = JsonlGenerationLogger::open(&path).unwrap();
            logger.log(GenerationEvent::new("generation", json!({ "run": run })));
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["run"], 1);
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("nested.jsonl");
        assert!(JsonlGenerationLogger::open(path).is_none());
    }
}
