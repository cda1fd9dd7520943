//! Expense Core - business logic for expense tracking and approval
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Entities, field validators, and the expense status state machine
//! - **ports**: Trait definitions for persistence and event logging
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{DuckDbRepository, MemoryRepository};
use config::Config;
use ports::{CategoryRepository, EventLog, ExpenseRepository, UserRepository};
use services::{CategoryService, ExpenseService, StatusService, UserService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    Category, CategoryInput, Expense, ExpenseInput, ExpenseStatus, Locale, User, UserInput,
};

/// File name of the expense store inside the data directory
pub const DATABASE_FILE: &str = "expenses.duckdb";

/// Main context for expense operations
///
/// Holds the configuration and one service per entity, all sharing the same
/// repository and event log.
pub struct ExpenseContext {
    pub config: Config,
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub expense_service: ExpenseService,
    pub status_service: StatusService,
}

impl ExpenseContext {
    /// Open the DuckDB store in `data_dir`, creating it and its schema if needed
    pub fn new(data_dir: &Path, events: Arc<dyn EventLog>) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let config = Config::load(data_dir)?;

        let repository = Arc::new(DuckDbRepository::new(&data_dir.join(DATABASE_FILE))?);
        repository.ensure_schema()?;

        Ok(Self::with_repository(config, repository, events))
    }

    /// A context backed by the in-memory store
    pub fn in_memory(config: Config, events: Arc<dyn EventLog>) -> Self {
        Self::with_repository(config, Arc::new(MemoryRepository::new()), events)
    }

    /// Wire services over any store implementing all three repository ports
    pub fn with_repository<R>(config: Config, repository: Arc<R>, events: Arc<dyn EventLog>) -> Self
    where
        R: UserRepository + CategoryRepository + ExpenseRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = repository.clone();
        let categories: Arc<dyn CategoryRepository> = repository.clone();
        let expenses: Arc<dyn ExpenseRepository> = repository;
        let locale = config.locale;

        let user_service = UserService::new(users.clone(), events.clone(), locale);
        let category_service =
            CategoryService::new(categories.clone(), expenses.clone(), events.clone(), locale);
        let expense_service = ExpenseService::new(
            expenses.clone(),
            users.clone(),
            categories.clone(),
            events.clone(),
            locale,
            config.default_currency.clone(),
        );
        let status_service = StatusService::new(users, categories, expenses, events, locale);

        Self {
            config,
            user_service,
            category_service,
            expense_service,
            status_service,
        }
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }
}
