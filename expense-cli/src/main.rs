//! Expense ledger CLI - submit and review expenses from the terminal

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use expense_core::domain::LogEvent;

mod commands;
mod output;

use commands::{category, expense, logs, summary, user, Logger};

/// Expense ledger - track and approve expenses
#[derive(Parser)]
#[command(name = "exp", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: category::CategoryCommands,
    },

    /// Submit, edit, and review expenses
    Expense {
        #[command(subcommand)]
        command: expense::ExpenseCommands,
    },

    /// Show totals per status and approved amounts per currency
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::User { command } => command.name(),
            Commands::Category { command } => command.name(),
            Commands::Expense { command } => command.name(),
            Commands::Summary { .. } => "summary",
            Commands::Logs { command } => command.name(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = commands::get_logger();
    let name = cli.command.name();

    commands::log_event(
        &logger,
        LogEvent::new("command_executed").with_operation(name),
    );

    match run(cli, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(&logger, LogEvent::new("command_failed").with_operation(name));
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logger: &Logger) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command {
        Commands::User { command } => runtime.block_on(user::run(command, logger)),
        Commands::Category { command } => runtime.block_on(category::run(command, logger)),
        Commands::Expense { command } => runtime.block_on(expense::run(command, logger)),
        Commands::Summary { json } => runtime.block_on(summary::run(json, logger)),
        Commands::Logs { command } => logs::run(command, logger),
    }
}
