//! Test doubles for service tests

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    Category, CategoryDraft, Expense, ExpenseChanges, ExpenseDraft, ExpenseStatus, LogEvent, User,
    UserDraft,
};
use crate::ports::{
    CategoryRepository, EventLog, ExpenseRepository, RepositoryError, RepositoryResult,
    UserRepository,
};

/// Keeps every recorded event for inspection
#[derive(Default)]
pub(crate) struct RecordingEventLog {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingEventLog {
    pub(crate) fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventLog for RecordingEventLog {
    fn record(&self, event: LogEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) const OUTAGE: &str = "connection refused";

/// Every call fails with a transport error
pub(crate) struct UnavailableRepository;

fn outage<T>() -> RepositoryResult<T> {
    Err(RepositoryError::Transport(OUTAGE.to_string()))
}

#[async_trait]
impl UserRepository for UnavailableRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        outage()
    }
    async fn get_by_id(&self, _id: &str) -> RepositoryResult<Option<User>> {
        outage()
    }
    async fn create(&self, _draft: UserDraft) -> RepositoryResult<User> {
        outage()
    }
    async fn update(&self, _id: &str, _draft: UserDraft) -> RepositoryResult<User> {
        outage()
    }
    async fn delete(&self, _id: &str) -> RepositoryResult<()> {
        outage()
    }
}

#[async_trait]
impl CategoryRepository for UnavailableRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Category>> {
        outage()
    }
    async fn get_by_id(&self, _id: &str) -> RepositoryResult<Option<Category>> {
        outage()
    }
    async fn create(&self, _draft: CategoryDraft) -> RepositoryResult<Category> {
        outage()
    }
    async fn update(&self, _id: &str, _draft: CategoryDraft) -> RepositoryResult<Category> {
        outage()
    }
    async fn delete(&self, _id: &str) -> RepositoryResult<()> {
        outage()
    }
}

#[async_trait]
impl ExpenseRepository for UnavailableRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Expense>> {
        outage()
    }
    async fn get_by_id(&self, _id: &str) -> RepositoryResult<Option<Expense>> {
        outage()
    }
    async fn get_by_user_id(&self, _user_id: &str) -> RepositoryResult<Vec<Expense>> {
        outage()
    }
    async fn get_by_user_and_status(
        &self,
        _user_id: &str,
        _status: ExpenseStatus,
    ) -> RepositoryResult<Vec<Expense>> {
        outage()
    }
    async fn get_by_category_id(&self, _category_id: &str) -> RepositoryResult<Vec<Expense>> {
        outage()
    }
    async fn create(&self, _draft: ExpenseDraft) -> RepositoryResult<Expense> {
        outage()
    }
    async fn update(&self, _id: &str, _changes: ExpenseChanges) -> RepositoryResult<Expense> {
        outage()
    }
    async fn update_status(&self, _id: &str, _status: ExpenseStatus) -> RepositoryResult<Expense> {
        outage()
    }
    async fn delete(&self, _id: &str) -> RepositoryResult<()> {
        outage()
    }
}
