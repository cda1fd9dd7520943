//! CLI command implementations

pub mod category;
pub mod expense;
pub mod logs;
pub mod summary;
pub mod user;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use dialoguer::{Confirm, Input};
use serde::Serialize;

use expense_core::domain::result::Result as CoreResult;
use expense_core::domain::LogEvent;
use expense_core::ports::{EventLog, NoopEventLog};
use expense_core::services::{EntryPoint, LoggingService};
use expense_core::{ExpenseContext, Locale, OperationResult};

/// The CLI's event log, absent when logs.duckdb could not be opened
pub type Logger = Option<Arc<LoggingService>>;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Logger {
    let expense_dir = get_expense_dir();
    std::fs::create_dir_all(&expense_dir).ok()?;
    LoggingService::new(&expense_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
        .ok()
        .map(Arc::new)
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Logger, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from EXPENSE_DIR or default to ~/.expense-ledger
pub fn get_expense_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("EXPENSE_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".expense-ledger")
    }
}

/// Open the expense store, wiring services to the CLI's event log
pub fn get_context(logger: &Logger) -> Result<ExpenseContext> {
    let expense_dir = get_expense_dir();
    let events: Arc<dyn EventLog> = match logger {
        Some(l) => l.clone(),
        None => Arc::new(NoopEventLog),
    };

    ExpenseContext::new(&expense_dir, events)
        .with_context(|| format!("Failed to open expense data in {}", expense_dir.display()))
}

/// Print a service outcome.
///
/// With `json` the outcome is written as an [`OperationResult`]; otherwise
/// `render` gets the data. Failures come back as errors in both modes so the
/// process exits non-zero.
pub fn report<T: Serialize>(
    result: CoreResult<T>,
    locale: Locale,
    json: bool,
    render: impl FnOnce(T),
) -> Result<()> {
    if json {
        let outcome = OperationResult::from_result(result, locale);
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        if let Some(error) = outcome.error {
            bail!(error);
        }
        return Ok(());
    }

    match result {
        Ok(data) => {
            render(data);
            Ok(())
        }
        Err(e) => Err(anyhow!(e.user_message(locale))),
    }
}

/// Use the given value or ask for it interactively
pub fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

/// Ask a yes/no question, defaulting to no
pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
