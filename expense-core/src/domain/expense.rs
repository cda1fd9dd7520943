//! Expense domain model

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::status::{ExpenseAction, ExpenseStatus, TransitionError};
use super::validation::{
    normalize_currency, round_amount, validate_amount, validate_date, validate_name,
    validate_optional_text, validate_required, Field, Violations, EXPENSE_DESCRIPTION_MAX,
    EXPENSE_TITLE_MAX,
};

/// A single expense claim filed by a user
///
/// Immutable: status changes and edits produce a new instance.
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    id: String,
    user_id: String,
    category_id: String,
    amount: Decimal,
    currency: String,
    title: String,
    description: String,
    date: DateTime<Utc>,
    status: ExpenseStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Stored expense fields, as read back by an adapter
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Rebuild an expense from stored fields.
    ///
    /// The date is not checked against the clock here; "not in the future"
    /// only applies when an expense is submitted.
    pub fn restore(record: ExpenseRecord) -> Result<Self, Violations> {
        let mut violations = validate_required(Field::Id, &record.id);
        violations.extend(validate_required(Field::UserId, &record.user_id));
        violations.extend(validate_required(Field::CategoryId, &record.category_id));
        violations.extend(validate_amount(Some(record.amount)));
        violations.extend(validate_required(Field::Currency, &record.currency));
        violations.extend(validate_name(Field::Title, &record.title, EXPENSE_TITLE_MAX));
        violations.extend(validate_optional_text(
            Field::ExpenseDescription,
            Some(&record.description),
            EXPENSE_DESCRIPTION_MAX,
        ));

        violations.into_result(Self {
            id: record.id,
            user_id: record.user_id,
            category_id: record.category_id,
            amount: record.amount,
            currency: record.currency,
            title: record.title,
            description: record.description,
            date: record.date,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn status(&self) -> ExpenseStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == ExpenseStatus::Pending
    }

    /// Pending → approved
    pub fn approve(&self) -> Result<Expense, TransitionError> {
        self.transition(ExpenseAction::Approve)
    }

    /// Pending → rejected
    pub fn reject(&self) -> Result<Expense, TransitionError> {
        self.transition(ExpenseAction::Reject)
    }

    /// Fails unless the expense may still be edited
    pub fn ensure_editable(&self) -> Result<(), TransitionError> {
        self.status.apply(ExpenseAction::Edit).map(|_| ())
    }

    /// Run `action` through the state machine, returning the resulting expense
    pub fn transition(&self, action: ExpenseAction) -> Result<Expense, TransitionError> {
        let next = self.status.apply(action)?;
        Ok(self.with_status(next))
    }

    fn with_status(&self, status: ExpenseStatus) -> Expense {
        Expense {
            status,
            ..self.clone()
        }
    }

    /// "Title: 1200 JPY"
    pub fn display_info(&self) -> String {
        format!("{}: {} {}", self.title, self.amount, self.currency)
    }
}

impl PartialEq for Expense {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Expense {}

impl Hash for Expense {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Raw expense fields as submitted by a caller
#[derive(Debug, Clone, Default)]
pub struct ExpenseInput {
    pub category_id: String,
    pub amount: Option<Decimal>,
    /// Falls back to the configured default currency when absent
    pub currency: Option<String>,
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

impl ExpenseInput {
    /// Check every field, in field order. `user_id` is checked when given.
    pub fn validate(&self, user_id: Option<&str>, now: DateTime<Utc>) -> Violations {
        let mut violations = Violations::new();
        if let Some(user_id) = user_id {
            violations.extend(validate_required(Field::UserId, user_id));
        }
        violations.extend(validate_required(Field::CategoryId, &self.category_id));
        violations.extend(validate_amount(self.amount));
        if let Some(currency) = &self.currency {
            violations.extend(validate_required(Field::Currency, currency));
        }
        violations.extend(validate_name(Field::Title, &self.title, EXPENSE_TITLE_MAX));
        violations.extend(validate_optional_text(
            Field::ExpenseDescription,
            Some(&self.description),
            EXPENSE_DESCRIPTION_MAX,
        ));
        violations.extend(validate_date(self.date, now));
        violations
    }

    /// Validate a new submission for `user_id`
    pub fn into_draft(
        self,
        user_id: &str,
        default_currency: &str,
        now: DateTime<Utc>,
    ) -> Result<ExpenseDraft, Violations> {
        let violations = self.validate(Some(user_id), now);
        if !violations.is_empty() {
            return Err(violations);
        }
        let fields = self.into_fields(default_currency, now);
        Ok(ExpenseDraft {
            user_id: user_id.trim().to_string(),
            category_id: fields.category_id,
            amount: fields.amount,
            currency: fields.currency,
            title: fields.title,
            description: fields.description,
            date: fields.date,
        })
    }

    /// Validate an edit of an existing expense
    pub fn into_changes(
        self,
        default_currency: &str,
        now: DateTime<Utc>,
    ) -> Result<ExpenseChanges, Violations> {
        let violations = self.validate(None, now);
        violations.into_result(self.into_fields(default_currency, now))
    }

    fn into_fields(self, default_currency: &str, now: DateTime<Utc>) -> ExpenseChanges {
        ExpenseChanges {
            category_id: self.category_id.trim().to_string(),
            amount: self.amount.map(round_amount).unwrap_or_default(),
            currency: normalize_currency(self.currency.as_deref().unwrap_or(default_currency)),
            title: self.title.trim().to_string(),
            description: self.description,
            date: self.date.unwrap_or(now),
        }
    }
}

/// Validated fields for a new expense; the store assigns id, status, and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub user_id: String,
    pub category_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

/// Validated replacement fields for an existing expense
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseChanges {
    pub category_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::messages::Locale;
    use crate::domain::validation::Rule;
    use chrono::Duration;

    fn record(status: ExpenseStatus) -> ExpenseRecord {
        let now = Utc::now();
        ExpenseRecord {
            id: "exp-1".to_string(),
            user_id: "user-1".to_string(),
            category_id: "cat-1".to_string(),
            amount: Decimal::new(123_450, 2),
            currency: "JPY".to_string(),
            title: "Team lunch".to_string(),
            description: String::new(),
            date: now - Duration::days(1),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn input() -> ExpenseInput {
        ExpenseInput {
            category_id: "cat-1".to_string(),
            amount: Some(Decimal::new(1500, 0)),
            currency: None,
            title: "Taxi".to_string(),
            description: "Airport".to_string(),
            date: Some(Utc::now() - Duration::hours(2)),
        }
    }

    #[test]
    fn test_restore_round_trip() {
        let rec = record(ExpenseStatus::Approved);
        let expense = Expense::restore(rec.clone()).unwrap();
        assert_eq!(expense.status(), rec.status);
        assert_eq!(expense.amount(), rec.amount);
        assert_eq!(expense.date(), rec.date);
        assert_eq!(expense.currency(), "JPY");
    }

    #[test]
    fn test_restore_allows_future_date() {
        let mut rec = record(ExpenseStatus::Pending);
        rec.date = Utc::now() + Duration::days(30);
        assert!(Expense::restore(rec).is_ok());
    }

    #[test]
    fn test_approve_and_reject_from_pending() {
        let expense = Expense::restore(record(ExpenseStatus::Pending)).unwrap();

        let approved = expense.approve().unwrap();
        assert_eq!(approved.status(), ExpenseStatus::Approved);
        assert_eq!(approved.id(), expense.id());
        assert_eq!(expense.status(), ExpenseStatus::Pending);

        let rejected = expense.reject().unwrap();
        assert_eq!(rejected.status(), ExpenseStatus::Rejected);
    }

    #[test]
    fn test_approve_rejected_expense_fails() {
        let expense = Expense::restore(record(ExpenseStatus::Rejected)).unwrap();
        let err = expense.approve().unwrap_err();
        assert_eq!(err.from, ExpenseStatus::Rejected);
        assert_eq!(err.action, ExpenseAction::Approve);
        assert_eq!(expense.status(), ExpenseStatus::Rejected);
    }

    #[test]
    fn test_only_pending_is_editable() {
        assert!(Expense::restore(record(ExpenseStatus::Pending))
            .unwrap()
            .ensure_editable()
            .is_ok());
        assert!(Expense::restore(record(ExpenseStatus::Approved))
            .unwrap()
            .ensure_editable()
            .is_err());
    }

    #[test]
    fn test_draft_uses_default_currency() {
        let draft = input().into_draft("user-1", "jpy", Utc::now()).unwrap();
        assert_eq!(draft.currency, "JPY");
        assert_eq!(draft.user_id, "user-1");
        assert_eq!(draft.amount, Decimal::new(1500, 0));
    }

    #[test]
    fn test_draft_amount_rounded_to_cents() {
        let mut fractional = input();
        fractional.amount = Some(Decimal::new(123_456, 5));
        let draft = fractional.into_draft("user-1", "JPY", Utc::now()).unwrap();
        assert_eq!(draft.amount, Decimal::new(123, 2));

        let mut tiny = input();
        tiny.amount = Some(Decimal::new(1, 5));
        let violations = tiny.into_changes("JPY", Utc::now()).unwrap_err();
        assert!(violations.contains(Field::Amount, Rule::Required));
    }

    #[test]
    fn test_amount_over_limit_rejected() {
        let mut over = input();
        over.amount = Some(Decimal::new(10_000_001, 0));
        let violations = over.into_draft("user-1", "JPY", Utc::now()).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations.contains(Field::Amount, Rule::ExceedsLimit));
        assert_eq!(violations.joined(Locale::En), "Amount must be 10,000,000 or less");
    }

    #[test]
    fn test_validation_reports_every_field() {
        let bad = ExpenseInput {
            category_id: " ".to_string(),
            amount: Some(Decimal::new(-10, 0)),
            currency: Some(String::new()),
            title: String::new(),
            description: "d".repeat(EXPENSE_DESCRIPTION_MAX + 1),
            date: Some(Utc::now() + Duration::days(1)),
        };
        let violations = bad.validate(Some(""), Utc::now());
        let fields: Vec<Field> = violations.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::UserId,
                Field::CategoryId,
                Field::Amount,
                Field::Currency,
                Field::Title,
                Field::ExpenseDescription,
                Field::Date,
            ]
        );
    }
}
