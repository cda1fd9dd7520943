//! Core domain entities
//!
//! Entities, validators, and the expense state machine. Pure data and rules,
//! no I/O.

mod category;
pub mod event;
mod expense;
pub mod messages;
pub mod result;
pub mod status;
mod user;
pub mod validation;

pub use category::{Category, CategoryDraft, CategoryInput};
pub use event::LogEvent;
pub use expense::{Expense, ExpenseChanges, ExpenseDraft, ExpenseInput, ExpenseRecord};
pub use messages::{Action, EntityKind, Locale, Notice, Operation};
pub use status::{ExpenseAction, ExpenseStatus, TransitionError};
pub use user::{User, UserDraft, UserInput};
pub use validation::{Field, Rule, Violation, Violations};
