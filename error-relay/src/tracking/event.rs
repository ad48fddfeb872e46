//! Error events flowing through the notification pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Free-form metadata attached to an event, keyed by field name.
pub type Details = serde_json::Map<String, Value>;

/// Generate a new error ID (`ERR-` followed by 12 upper-case hex digits).
pub fn generate_error_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("ERR-{}", raw[..12].to_ascii_uppercase())
}

/// The underlying failure being reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalError {
    /// Display text of the outermost error.
    pub message: String,
    /// Display text of each `source()` in the chain, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl OriginalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Capture the message and the full `source()` chain of `err`.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            causes,
        }
    }
}

impl fmt::Display for OriginalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A tracked failure, ready to be handed to notification sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Unique per occurrence.
    pub id: String,
    pub original: OriginalError,
    /// Short description of the operation that failed.
    pub context: String,
    #[serde(default, skip_serializing_if = "Details::is_empty")]
    pub details: Details,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub occurred_at: DateTime<Utc>,
    /// Deployment environment, stamped by the dispatcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl ErrorEvent {
    /// Create an event with a freshly generated ID.
    pub fn new(original: OriginalError, context: impl Into<String>) -> Self {
        Self::with_id(generate_error_id(), original, context)
    }

    pub fn with_id(id: impl Into<String>, original: OriginalError, context: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original,
            context: context.into(),
            details: Details::new(),
            stack_trace: None,
            occurred_at: Utc::now(),
            environment: None,
        }
    }

    pub fn details(mut self, details: Details) -> Self {
        self.details = details;
        self
    }

    pub fn stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// The stack trace, if one was captured and is not blank.
    pub fn stack_trace_text(&self) -> Option<&str> {
        self.stack_trace.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The environment label, if configured and not blank.
    pub fn environment_label(&self) -> Option<&str> {
        self.environment.as_deref().filter(|s| !s.is_empty())
    }
}

/// Turn a JSON object into [`Details`]; any other value yields an empty map.
pub fn details_from(value: Value) -> Details {
    match value {
        Value::Object(map) => map,
        _ => Details::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("validation failed: {0}")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("email format is invalid")]
    struct Inner;

    #[test]
    fn test_generate_error_id_format() {
        let id = generate_error_id();
        assert!(id.starts_with("ERR-"));
        assert_eq!(id.len(), 16);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(id, generate_error_id());
    }

    #[test]
    fn test_original_error_walks_source_chain() {
        let original = OriginalError::from_error(&Outer(Inner));
        assert_eq!(original.message, "validation failed: email format is invalid");
        assert_eq!(original.causes, vec!["email format is invalid".to_string()]);
        assert_eq!(original.to_string(), original.message);
    }

    #[test]
    fn test_event_builders() {
        let event = ErrorEvent::with_id("ERR-1", OriginalError::new("boom"), "doing things")
            .details(details_from(json!({"port": 5432})))
            .stack_trace("frame 1")
            .environment("staging");

        assert_eq!(event.id, "ERR-1");
        assert_eq!(event.details["port"], 5432);
        assert_eq!(event.stack_trace_text(), Some("frame 1"));
        assert_eq!(event.environment_label(), Some("staging"));
    }

    #[test]
    fn test_blank_optionals_are_absent() {
        let event = ErrorEvent::new(OriginalError::new("boom"), "ctx")
            .stack_trace("   ")
            .environment("");
        assert_eq!(event.stack_trace_text(), None);
        assert_eq!(event.environment_label(), None);
    }

    #[test]
    fn test_details_from_non_object() {
        assert!(details_from(json!([1, 2])).is_empty());
        assert!(details_from(Value::Null).is_empty());
    }
}
