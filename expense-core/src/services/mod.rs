//! Service layer - business logic orchestration
//!
//! Services validate input, call the repository ports, and translate
//! failures into user-facing errors. Each service covers one entity.

mod category;
mod expense;
pub mod logging;
pub mod migration;
mod report;
mod status;
mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use category::CategoryService;
pub use expense::ExpenseService;
pub use logging::{EntryPoint, LogEntry, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use status::{CurrencyTotal, StatusCount, StatusService, StatusSummary};
pub use user::UserService;
