//! Repository ports - persistence abstraction
//!
//! One trait per entity. Implementations (adapters) provide the actual
//! storage; services only ever see these traits.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    Category, CategoryDraft, Expense, ExpenseChanges, ExpenseDraft, ExpenseStatus, User,
    UserDraft,
};

/// Failure reported by a repository
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A write targeted an id that does not exist
    #[error("record not found: {0}")]
    NotFound(String),

    /// The store could not complete the call
    #[error("{0}")]
    Transport(String),
}

impl RepositoryError {
    pub fn transport(cause: impl ToString) -> Self {
        Self::Transport(cause.to_string())
    }
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_all(&self) -> RepositoryResult<Vec<User>>;

    /// `Ok(None)` when no user has this id
    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<User>>;

    /// Persist a new user; the store assigns id and timestamps
    async fn create(&self, draft: UserDraft) -> RepositoryResult<User>;

    async fn update(&self, id: &str, draft: UserDraft) -> RepositoryResult<User>;

    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn get_all(&self) -> RepositoryResult<Vec<Category>>;

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Category>>;

    async fn create(&self, draft: CategoryDraft) -> RepositoryResult<Category>;

    async fn update(&self, id: &str, draft: CategoryDraft) -> RepositoryResult<Category>;

    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn get_all(&self) -> RepositoryResult<Vec<Expense>>;

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Expense>>;

    async fn get_by_user_id(&self, user_id: &str) -> RepositoryResult<Vec<Expense>>;

    async fn get_by_user_and_status(
        &self,
        user_id: &str,
        status: ExpenseStatus,
    ) -> RepositoryResult<Vec<Expense>>;

    async fn get_by_category_id(&self, category_id: &str) -> RepositoryResult<Vec<Expense>>;

    /// Persist a new expense in the pending state
    async fn create(&self, draft: ExpenseDraft) -> RepositoryResult<Expense>;

    /// Replace the editable fields; status is left as stored
    async fn update(&self, id: &str, changes: ExpenseChanges) -> RepositoryResult<Expense>;

    async fn update_status(&self, id: &str, status: ExpenseStatus) -> RepositoryResult<Expense>;

    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}
