//! Diagnostic log events
//!
//! Events describe what happened, never the data involved: no names, emails,
//! titles, or amounts belong in an event.

use serde::{Deserialize, Serialize};

use super::messages::{EntityKind, Operation};

/// Event name used when a repository call fails
pub const REPOSITORY_ERROR: &str = "repository_error";

/// A log event to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            entity: None,
            operation: None,
            error_message: None,
            error_details: None,
        }
    }

    /// A failed repository call during `operation`
    pub fn repository_error(operation: Operation, cause: impl Into<String>) -> Self {
        Self::new(REPOSITORY_ERROR)
            .with_entity(operation.entity)
            .with_operation(operation.name())
            .with_error(cause)
    }

    pub fn with_entity(mut self, entity: EntityKind) -> Self {
        self.entity = Some(entity.as_str().to_string());
        self
    }

    /// Set the operation context (service operation or CLI command)
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::messages::Action;

    #[test]
    fn test_repository_error_event() {
        let op = Operation::new(Action::Update, EntityKind::Category);
        let event = LogEvent::repository_error(op, "connection reset");
        assert_eq!(event.event, REPOSITORY_ERROR);
        assert_eq!(event.entity.as_deref(), Some("category"));
        assert_eq!(event.operation.as_deref(), Some("update_category"));
        assert_eq!(event.error_message.as_deref(), Some("connection reset"));
        assert!(event.error_details.is_none());
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_string(&LogEvent::new("command_executed")).unwrap();
        assert_eq!(json, r#"{"event":"command_executed"}"#);
    }
}
