//! User service - validated user CRUD

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Action, EntityKind, Locale, Operation, User, UserInput};
use crate::ports::{EventLog, UserRepository};

use super::report::Reporter;

const FETCH: Operation = Operation::new(Action::Fetch, EntityKind::User);
const CREATE: Operation = Operation::new(Action::Create, EntityKind::User);
const UPDATE: Operation = Operation::new(Action::Update, EntityKind::User);
const DELETE: Operation = Operation::new(Action::Delete, EntityKind::User);

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    report: Reporter,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        events: Arc<dyn EventLog>,
        locale: Locale,
    ) -> Self {
        Self {
            repository,
            report: Reporter::new(events, locale),
        }
    }

    pub async fn create(&self, input: UserInput) -> Result<User> {
        let draft = input.into_draft().map_err(|v| self.report.invalid(v))?;
        self.repository
            .create(draft)
            .await
            .map_err(|e| self.report.repository(CREATE, e))
    }

    /// `Ok(None)` when no user has this id
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }

    pub async fn update(&self, id: &str, input: UserInput) -> Result<User> {
        let draft = input.into_draft().map_err(|v| self.report.invalid(v))?;
        self.repository
            .update(id, draft)
            .await
            .map_err(|e| self.report.repository(UPDATE, e))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| self.report.repository(DELETE, e))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.repository
            .get_all()
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }
}
