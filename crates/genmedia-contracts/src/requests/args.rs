use serde_json::{Map, Value};

use crate::error::ValidationError;

pub type ToolArguments = Map<String, Value>;

/// Typed view over the untyped argument mapping a tool call arrives with.
///
/// Every accessor treats JSON `null` and blank strings as absent. A value of
/// the wrong JSON type is rejected rather than ignored.
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a> {
    raw: &'a ToolArguments,
}

impl<'a> ToolArgs<'a> {
    pub fn new(raw: &'a ToolArguments) -> Self {
        Self { raw }
    }

    pub fn required_str(&self, field: &str) -> Result<String, ValidationError> {
        self.optional_str(field)?
            .ok_or_else(|| ValidationError::missing(field))
    }

    pub fn optional_str(&self, field: &str) -> Result<Option<String>, ValidationError> {
        match self.raw.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(non_empty(value)),
            Some(_) => Err(ValidationError::invalid(field, "must be a string")),
        }
    }

    /// Accepts JSON integers, floats with no fractional part, and numeric
    /// strings. Range checks are left to the caller.
    pub fn optional_integer(&self, field: &str) -> Result<Option<i64>, ValidationError> {
        let not_whole = || ValidationError::invalid(field, "must be a whole number");
        match self.raw.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => {
                if let Some(value) = number.as_i64() {
                    return Ok(Some(value));
                }
                match number.as_f64() {
                    Some(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                        Ok(Some(value as i64))
                    }
                    _ => Err(not_whole()),
                }
            }
            Some(Value::String(value)) => match non_empty(value) {
                None => Ok(None),
                Some(text) => text.parse::<i64>().map(Some).map_err(|_| not_whole()),
            },
            Some(_) => Err(not_whole()),
        }
    }

    pub fn optional_bool(&self, field: &str) -> Result<Option<bool>, ValidationError> {
        let not_bool = || ValidationError::invalid(field, "must be true or false");
        match self.raw.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(Value::String(value)) => match non_empty(value) {
                None => Ok(None),
                Some(text) => match text.to_ascii_lowercase().as_str() {
                    "true" => Ok(Some(true)),
                    "false" => Ok(Some(false)),
                    _ => Err(not_bool()),
                },
            },
            Some(_) => Err(not_bool()),
        }
    }

    /// Structured input that callers usually send as encoded JSON text. An
    /// inline JSON array or object is re-encoded so downstream parsing sees a
    /// single representation.
    pub fn optional_json_text(&self, field: &str) -> Result<Option<String>, ValidationError> {
        match self.raw.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(non_empty(value)),
            Some(value @ (Value::Array(_) | Value::Object(_))) => Ok(Some(value.to_string())),
            Some(_) => Err(ValidationError::MalformedInput {
                field: field.to_string(),
                reason: "expected a JSON array encoded as text".to_string(),
            }),
        }
    }

    /// Argument names outside `known`, in key order.
    pub fn unrecognized(&self, known: &[&str]) -> Vec<&'a str> {
        self.raw
            .keys()
            .map(String::as_str)
            .filter(|key| !known.contains(key))
            .collect()
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
