//! Failure reporting shared by the entity services

use std::sync::Arc;

use crate::domain::result::Error;
use crate::domain::{LogEvent, Locale, Operation, Violations};
use crate::ports::{EventLog, RepositoryError};

/// Turns violations and repository failures into [`Error`]s in one locale,
/// recording transport causes to the event log on the way.
#[derive(Clone)]
pub(crate) struct Reporter {
    events: Arc<dyn EventLog>,
    locale: Locale,
}

impl Reporter {
    pub(crate) fn new(events: Arc<dyn EventLog>, locale: Locale) -> Self {
        Self { events, locale }
    }

    pub(crate) fn locale(&self) -> Locale {
        self.locale
    }

    /// Validation failures are reported to the caller only, never logged
    pub(crate) fn invalid(&self, violations: Violations) -> Error {
        Error::validation(violations, self.locale)
    }

    pub(crate) fn repository(&self, operation: Operation, err: RepositoryError) -> Error {
        match err {
            RepositoryError::NotFound(id) => Error::not_found(operation.entity, id),
            RepositoryError::Transport(cause) => {
                self.events
                    .record(LogEvent::repository_error(operation, cause));
                Error::transport(operation, self.locale)
            }
        }
    }
}
