//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::messages::{
    category_in_use_message, failure_message, not_found_message, EntityKind, Locale, Operation,
};
use super::status::TransitionError;
use super::validation::Violations;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// One or more input rules were broken; `message` is already localized
    #[error("{message}")]
    Validation {
        violations: Violations,
        message: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The store failed; the cause went to the event log, `message` is generic
    #[error("{message}")]
    Transport {
        operation: Operation,
        message: String,
    },

    #[error("category {id} is used by existing expenses")]
    CategoryInUse { id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error with messages rendered in `locale`
    pub fn validation(violations: Violations, locale: Locale) -> Self {
        let message = violations.joined(locale);
        Self::Validation {
            violations,
            message,
        }
    }

    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a transport error carrying the generic failure message
    pub fn transport(operation: Operation, locale: Locale) -> Self {
        Self::Transport {
            operation,
            message: failure_message(operation, locale),
        }
    }

    /// Text suitable for showing to an end user
    pub fn user_message(&self, locale: Locale) -> String {
        match self {
            Error::Validation { message, .. } | Error::Transport { message, .. } => {
                message.clone()
            }
            Error::NotFound { entity, id } => not_found_message(*entity, id, locale),
            Error::Transition(e) => e.message(locale),
            Error::CategoryInUse { .. } => category_in_use_message(locale),
            other => other.to_string(),
        }
    }

    /// Stable machine-readable kind, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::NotFound { .. } => "not_found",
            Error::Transition(_) => "transition",
            Error::Transport { .. } => "transport",
            Error::CategoryInUse { .. } => "category_in_use",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation outcome with optional context, for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }

    /// Convert a service outcome, rendering any error in `locale`.
    ///
    /// Failures carry `kind` in the context, and validation failures also
    /// carry the individual violations.
    pub fn from_result(result: Result<T>, locale: Locale) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::Value::from(e.kind()));
                if let Error::Validation { violations, .. } = &e {
                    if let Ok(value) = serde_json::to_value(violations) {
                        context.insert("violations".to_string(), value);
                    }
                }
                Self::fail_with_context(e.user_message(locale), context)
            }
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        Self::from_result(result, Locale::En)
    }
}
