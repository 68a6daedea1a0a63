use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::requests::{Operation, ValidatedDescriptor};

pub type EventPayload = Map<String, Value>;

pub const REQUEST_VALIDATED: &str = "request_validated";
pub const REQUEST_REJECTED: &str = "request_rejected";

/// Append-only JSONL log of request outcomes.
///
/// - default fields are `type`, `session_id`, `ts`
/// - caller payload is merged last and can override defaults
/// - one compact JSON object per line
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    session_id: String,
    lock: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                session_id: session_id.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn emit(&self, event_type: &str, payload: EventPayload) -> anyhow::Result<Value> {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(event_type.to_string()));
        event.insert(
            "session_id".to_string(),
            Value::String(self.inner.session_id.clone()),
        );
        event.insert("ts".to_string(), Value::String(now_utc_iso()));
        for (key, value) in payload {
            event.insert(key, value);
        }

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let line = serde_json::to_string(&event)?;
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        Ok(Value::Object(event))
    }

    /// Records whether a request passed validation.
    pub fn emit_outcome(
        &self,
        operation: Operation,
        outcome: &Result<ValidatedDescriptor, ValidationError>,
    ) -> anyhow::Result<Value> {
        let (event_type, payload) = outcome_event(operation, outcome)?;
        self.emit(event_type, payload)
    }
}

pub fn outcome_event(
    operation: Operation,
    outcome: &Result<ValidatedDescriptor, ValidationError>,
) -> anyhow::Result<(&'static str, EventPayload)> {
    let mut payload = EventPayload::new();
    payload.insert(
        "operation".to_string(),
        Value::String(operation.tool_name().to_string()),
    );
    let event_type = match outcome {
        Ok(descriptor) => {
            payload.insert("descriptor".to_string(), serde_json::to_value(descriptor)?);
            REQUEST_VALIDATED
        }
        Err(err) => {
            payload.insert("error".to_string(), Value::String(err.to_string()));
            if let Some(field) = err.field() {
                payload.insert("field".to_string(), Value::String(field.to_string()));
            }
            REQUEST_REJECTED
        }
    };
    Ok((event_type, payload))
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::DateTime;

    use super::*;

    #[test]
    fn emit_writes_compact_jsonl_line() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let writer = EventWriter::new(&path, "session-123");

        let mut payload = EventPayload::new();
        payload.insert("operation".to_string(), Value::String("veo_t2v".to_string()));
        let emitted = writer.emit("request_validated", payload)?;

        let content = fs::read_to_string(&path)?;
        let line = content.lines().next().unwrap_or("");
        let parsed: Value = serde_json::from_str(line)?;

        assert_eq!(parsed, emitted);
        assert_eq!(parsed["type"], Value::String("request_validated".to_string()));
        assert_eq!(parsed["session_id"], Value::String("session-123".to_string()));
        assert_eq!(parsed["operation"], Value::String("veo_t2v".to_string()));

        let ts = parsed["ts"].as_str().unwrap_or("");
        DateTime::parse_from_rfc3339(ts)?;
        Ok(())
    }

    #[test]
    fn payload_can_override_default_keys() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path().join("events.jsonl"), "session-123");

        let mut payload = EventPayload::new();
        payload.insert(
            "session_id".to_string(),
            Value::String("override".to_string()),
        );
        let emitted = writer.emit("request_rejected", payload)?;
        assert_eq!(emitted["session_id"], Value::String("override".to_string()));
        Ok(())
    }

    #[test]
    fn rejection_outcome_records_error_and_field() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("events.jsonl");
        let writer = EventWriter::new(&path, "session-123");

        let outcome = Err(ValidationError::missing("prompt"));
        writer.emit_outcome(Operation::TextToVideo, &outcome)?;
        writer.emit_outcome(Operation::TextToImage, &outcome)?;

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0])?;
        assert_eq!(first["type"], Value::String(REQUEST_REJECTED.to_string()));
        assert_eq!(first["field"], Value::String("prompt".to_string()));
        assert_eq!(
            first["error"],
            Value::String("prompt must be a non-empty string and is required".to_string())
        );
        let second: Value = serde_json::from_str(lines[1])?;
        assert_eq!(second["operation"], Value::String("imagen_t2i".to_string()));
        Ok(())
    }
}
