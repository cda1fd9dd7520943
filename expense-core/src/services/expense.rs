//! Expense service - submissions, edits, and the approval workflow
//!
//! Every write validates its input first. Submissions must name an existing
//! user and category; edits are only accepted while an expense is pending.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Action, EntityKind, Expense, ExpenseAction, ExpenseInput, ExpenseStatus, Locale, Operation,
};
use crate::ports::{CategoryRepository, EventLog, ExpenseRepository, UserRepository};

use super::report::Reporter;

const FETCH: Operation = Operation::new(Action::Fetch, EntityKind::Expense);
const CREATE: Operation = Operation::new(Action::Create, EntityKind::Expense);
const UPDATE: Operation = Operation::new(Action::Update, EntityKind::Expense);
const DELETE: Operation = Operation::new(Action::Delete, EntityKind::Expense);
const APPROVE: Operation = Operation::new(Action::Approve, EntityKind::Expense);
const REJECT: Operation = Operation::new(Action::Reject, EntityKind::Expense);

pub struct ExpenseService {
    expenses: Arc<dyn ExpenseRepository>,
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    default_currency: String,
    report: Reporter,
}

impl ExpenseService {
    pub fn new(
        expenses: Arc<dyn ExpenseRepository>,
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        events: Arc<dyn EventLog>,
        locale: Locale,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            expenses,
            users,
            categories,
            default_currency: default_currency.into(),
            report: Reporter::new(events, locale),
        }
    }

    pub fn locale(&self) -> Locale {
        self.report.locale()
    }

    /// Submit a new pending expense for `user_id`
    pub async fn create(&self, user_id: &str, input: ExpenseInput) -> Result<Expense> {
        let draft = input
            .into_draft(user_id, &self.default_currency, Utc::now())
            .map_err(|v| self.report.invalid(v))?;

        self.ensure_user(&draft.user_id, CREATE).await?;
        self.ensure_category(&draft.category_id, CREATE).await?;

        self.expenses
            .create(draft)
            .await
            .map_err(|e| self.report.repository(CREATE, e))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Expense>> {
        self.expenses
            .get_by_id(id)
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }

    /// Replace the details of a pending expense
    pub async fn update(&self, id: &str, input: ExpenseInput) -> Result<Expense> {
        let changes = input
            .into_changes(&self.default_currency, Utc::now())
            .map_err(|v| self.report.invalid(v))?;

        let existing = self.load(id, UPDATE).await?;
        existing.ensure_editable()?;
        self.ensure_category(&changes.category_id, UPDATE).await?;

        self.expenses
            .update(id, changes)
            .await
            .map_err(|e| self.report.repository(UPDATE, e))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.expenses
            .delete(id)
            .await
            .map_err(|e| self.report.repository(DELETE, e))
    }

    pub async fn list(&self) -> Result<Vec<Expense>> {
        self.expenses
            .get_all()
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Expense>> {
        self.ensure_user(user_id, FETCH).await?;
        self.expenses
            .get_by_user_id(user_id)
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }

    pub async fn list_by_user_and_status(
        &self,
        user_id: &str,
        status: ExpenseStatus,
    ) -> Result<Vec<Expense>> {
        self.ensure_user(user_id, FETCH).await?;
        self.expenses
            .get_by_user_and_status(user_id, status)
            .await
            .map_err(|e| self.report.repository(FETCH, e))
    }

    /// Pending → approved
    pub async fn approve(&self, id: &str) -> Result<Expense> {
        self.transition(id, ExpenseAction::Approve, APPROVE).await
    }

    /// Pending → rejected
    pub async fn reject(&self, id: &str) -> Result<Expense> {
        self.transition(id, ExpenseAction::Reject, REJECT).await
    }

    async fn transition(
        &self,
        id: &str,
        action: ExpenseAction,
        operation: Operation,
    ) -> Result<Expense> {
        let expense = self.load(id, operation).await?;
        let next = expense.transition(action)?;
        self.expenses
            .update_status(id, next.status())
            .await
            .map_err(|e| self.report.repository(operation, e))
    }

    async fn load(&self, id: &str, operation: Operation) -> Result<Expense> {
        self.expenses
            .get_by_id(id)
            .await
            .map_err(|e| self.report.repository(operation, e))?
            .ok_or_else(|| Error::not_found(EntityKind::Expense, id))
    }

    async fn ensure_user(&self, user_id: &str, operation: Operation) -> Result<()> {
        match self
            .users
            .get_by_id(user_id)
            .await
            .map_err(|e| self.report.repository(operation, e))?
        {
            Some(_) => Ok(()),
            None => Err(Error::not_found(EntityKind::User, user_id)),
        }
    }

    async fn ensure_category(&self, category_id: &str, operation: Operation) -> Result<()> {
        match self
            .categories
            .get_by_id(category_id)
            .await
            .map_err(|e| self.report.repository(operation, e))?
        {
            Some(_) => Ok(()),
            None => Err(Error::not_found(EntityKind::Category, category_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryRepository;
    use crate::domain::{CategoryDraft, Field, Rule, UserDraft};
    use crate::services::testing::{RecordingEventLog, UnavailableRepository, OUTAGE};
    use chrono::Duration;
    use rust_decimal::Decimal;

    struct Fixture {
        service: ExpenseService,
        repo: Arc<MemoryRepository>,
        events: Arc<RecordingEventLog>,
        user_id: String,
        category_id: String,
    }

    async fn fixture(locale: Locale) -> Fixture {
        let repo = Arc::new(MemoryRepository::new());
        let events = Arc::new(RecordingEventLog::default());
        let user = UserRepository::create(
            repo.as_ref(),
            UserDraft {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        let category = CategoryRepository::create(
            repo.as_ref(),
            CategoryDraft {
                name: "Travel".to_string(),
                description: String::new(),
                color: "#3b82f6".to_string(),
            },
        )
        .await
        .unwrap();

        let service = ExpenseService::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            events.clone(),
            locale,
            "JPY",
        );
        Fixture {
            service,
            repo,
            events,
            user_id: user.id().to_string(),
            category_id: category.id().to_string(),
        }
    }

    fn input(category_id: &str, amount: Decimal) -> ExpenseInput {
        ExpenseInput {
            category_id: category_id.to_string(),
            amount: Some(amount),
            currency: None,
            title: "Taxi".to_string(),
            description: "From the airport".to_string(),
            date: Some(Utc::now() - Duration::hours(3)),
        }
    }

    #[tokio::test]
    async fn test_create_pending_expense() {
        let f = fixture(Locale::En).await;
        let expense = f
            .service
            .create(&f.user_id, input(&f.category_id, Decimal::new(4200, 0)))
            .await
            .unwrap();

        assert_eq!(expense.status(), ExpenseStatus::Pending);
        assert_eq!(expense.currency(), "JPY");
        assert_eq!(expense.amount(), Decimal::new(4200, 0));
        assert_eq!(f.service.list_by_user(&f.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_amount_over_limit_is_rejected() {
        let f = fixture(Locale::En).await;
        let err = f
            .service
            .create(&f.user_id, input(&f.category_id, Decimal::new(10_000_001, 0)))
            .await
            .unwrap_err();

        match &err {
            Error::Validation { violations, .. } => {
                assert!(violations.contains(Field::Amount, Rule::ExceedsLimit));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Amount must be 10,000,000 or less");
        assert!(f.events.events().is_empty());
        assert!(f.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_known_user_and_category() {
        let f = fixture(Locale::En).await;
        let err = f
            .service
            .create("nobody", input(&f.category_id, Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: EntityKind::User, .. }));

        let err = f
            .service
            .create(&f.user_id, input("nowhere", Decimal::ONE))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: EntityKind::Category, .. }));
    }

    #[tokio::test]
    async fn test_approve_then_reject_fails() {
        let f = fixture(Locale::En).await;
        let expense = f
            .service
            .create(&f.user_id, input(&f.category_id, Decimal::new(800, 0)))
            .await
            .unwrap();

        let approved = f.service.approve(expense.id()).await.unwrap();
        assert_eq!(approved.status(), ExpenseStatus::Approved);

        let err = f.service.reject(expense.id()).await.unwrap_err();
        assert!(matches!(err, Error::Transition(_)));
        let stored = f.service.get(expense.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ExpenseStatus::Approved);
    }

    #[tokio::test]
    async fn test_approve_rejected_expense_keeps_status() {
        let f = fixture(Locale::Ja).await;
        let expense = f
            .service
            .create(&f.user_id, input(&f.category_id, Decimal::new(800, 0)))
            .await
            .unwrap();
        f.repo
            .update_status(expense.id(), ExpenseStatus::Rejected)
            .await
            .unwrap();

        let err = f.service.approve(expense.id()).await.unwrap_err();
        assert_eq!(
            err.user_message(Locale::Ja),
            "承認待ちの経費のみ承認できます（現在のステータス: 却下済み）"
        );
        let stored = f.service.get(expense.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), ExpenseStatus::Rejected);
    }

    #[tokio::test]
    async fn test_update_only_while_pending() {
        let f = fixture(Locale::En).await;
        let expense = f
            .service
            .create(&f.user_id, input(&f.category_id, Decimal::new(1000, 0)))
            .await
            .unwrap();

        let mut edit = input(&f.category_id, Decimal::new(1250, 0));
        edit.title = "Taxi and tip".to_string();
        let updated = f.service.update(expense.id(), edit.clone()).await.unwrap();
        assert_eq!(updated.title(), "Taxi and tip");
        assert_eq!(updated.amount(), Decimal::new(1250, 0));
        assert_eq!(updated.status(), ExpenseStatus::Pending);

        f.service.approve(expense.id()).await.unwrap();
        let err = f.service.update(expense.id(), edit).await.unwrap_err();
        assert!(matches!(err, Error::Transition(_)));
    }

    #[tokio::test]
    async fn test_list_by_user_and_status() {
        let f = fixture(Locale::En).await;
        let first = f
            .service
            .create(&f.user_id, input(&f.category_id, Decimal::new(100, 0)))
            .await
            .unwrap();
        f.service
            .create(&f.user_id, input(&f.category_id, Decimal::new(200, 0)))
            .await
            .unwrap();
        f.service.approve(first.id()).await.unwrap();

        let pending = f
            .service
            .list_by_user_and_status(&f.user_id, ExpenseStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount(), Decimal::new(200, 0));

        let err = f
            .service
            .list_by_user_and_status("nobody", ExpenseStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_transport_failure_on_approve() {
        let events = Arc::new(RecordingEventLog::default());
        let service = ExpenseService::new(
            Arc::new(UnavailableRepository),
            Arc::new(UnavailableRepository),
            Arc::new(UnavailableRepository),
            events.clone(),
            Locale::En,
            "JPY",
        );

        let err = service.approve("e1").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to approve expense");

        let logged = events.events();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].event, "repository_error");
        assert_eq!(logged[0].entity.as_deref(), Some("expense"));
        assert_eq!(logged[0].error_message.as_deref(), Some(OUTAGE));
    }
}
