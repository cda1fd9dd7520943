//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod event_log;
mod repository;

pub use event_log::{EventLog, NoopEventLog};
pub use repository::{
    CategoryRepository, ExpenseRepository, RepositoryError, RepositoryResult, UserRepository,
};
