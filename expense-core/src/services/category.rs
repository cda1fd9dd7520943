//! Category service - validated category CRUD
//!
//! A category still referenced by an expense cannot be deleted.

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{Action, Category, CategoryInput, EntityKind, Locale, Operation};
use crate::ports::{CategoryRepository, EventLog, ExpenseRepository};

use super::report::Reporter;

const FETCH: Operation = Operation::new(Action::Fetch, EntityKind::Category);
const CREATE: Operation = Operation::new(Action::Create, EntityKind::Category);
const UPDATE: Operation = Operation::new(Action::Update, EntityKind::Category);
const DELETE: Operation = Operation::new(Action::Delete, EntityKind::Category);

pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    report: Reporter,
}

impl CategoryService {
    pub fn new(
        repository: Arc<dyn CategoryRepository>,
        expenses: Arc<dyn ExpenseRepository>,
        events: Arc<dyn EventLog>,
        locale: Locale,
    ) -> Self {
        Self {
            repository,
            expenses,
            report: Reporter::new(events, locale),
        }
    }

    /// Create a category; a missing color becomes the default
    pub async fn create(&self, input: CategoryInput) -> Result<Category> {
        let draft = input.into_draft().map_err(|v| self.report.invalid(v))?;
        self.repository
            .create(draft)
            .await
            .map_err(|e| self.report.repository(CREATE, e))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Category>> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }

    pub async fn update(&self, id: &str, input: CategoryInput) -> Result<Category> {
        let draft = input.into_draft().map_err(|v| self.report.invalid(v))?;
        self.repository
            .update(id, draft)
            .await
            .map_err(|e| self.report.repository(UPDATE, e))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let in_use = self
            .expenses
            .get_by_category_id(id)
            .await
            .map_err(|e| self.report.repository(DELETE, e))?;
        if !in_use.is_empty() {
            return Err(Error::CategoryInUse { id: id.to_string() });
        }

        self.repository
            .delete(id)
            .await
            .map_err(|e| self.report.repository(DELETE, e))
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.repository
            .get_all()
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }
}
