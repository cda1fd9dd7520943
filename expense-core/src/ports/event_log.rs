//! Event log port - sink for diagnostic events

use crate::domain::LogEvent;

/// Records diagnostic events. Recording never fails from the caller's view.
pub trait EventLog: Send + Sync {
    fn record(&self, event: LogEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventLog;

impl EventLog for NoopEventLog {
    fn record(&self, _event: LogEvent) {}
}
