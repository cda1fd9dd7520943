//! Status service - ledger summary

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{Action, EntityKind, ExpenseStatus, Locale, Operation};
use crate::ports::{CategoryRepository, EventLog, ExpenseRepository, UserRepository};

use super::report::Reporter;

/// Summary of users, categories, and expenses
pub struct StatusService {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    expenses: Arc<dyn ExpenseRepository>,
    report: Reporter,
}

impl StatusService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        expenses: Arc<dyn ExpenseRepository>,
        events: Arc<dyn EventLog>,
        locale: Locale,
    ) -> Self {
        Self {
            users,
            categories,
            expenses,
            report: Reporter::new(events, locale),
        }
    }

    pub async fn summary(&self) -> Result<StatusSummary> {
        let users = self
            .users
            .get_all()
            .await
            .map_err(|e| self.report.repository(fetch(EntityKind::User), e))?;
        let categories = self
            .categories
            .get_all()
            .await
            .map_err(|e| self.report.repository(fetch(EntityKind::Category), e))?;
        let expenses = self
            .expenses
            .get_all()
            .await
            .map_err(|e| self.report.repository(fetch(EntityKind::Expense), e))?;

        let by_status = ExpenseStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: expenses.iter().filter(|e| e.status() == *status).count(),
            })
            .collect();

        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for expense in expenses
            .iter()
            .filter(|e| e.status() == ExpenseStatus::Approved)
        {
            *totals.entry(expense.currency().to_string()).or_default() += expense.amount();
        }

        Ok(StatusSummary {
            total_users: users.len(),
            total_categories: categories.len(),
            total_expenses: expenses.len(),
            by_status,
            approved_totals: totals
                .into_iter()
                .map(|(currency, amount)| CurrencyTotal { currency, amount })
                .collect(),
        })
    }
}

fn fetch(entity: EntityKind) -> Operation {
    Operation::new(Action::Fetch, entity)
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_users: usize,
    pub total_categories: usize,
    pub total_expenses: usize,
    pub by_status: Vec<StatusCount>,
    /// Sum of approved amounts, one entry per currency
    pub approved_totals: Vec<CurrencyTotal>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: ExpenseStatus,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CurrencyTotal {
    pub currency: String,
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryRepository;
    use crate::domain::ExpenseDraft;
    use crate::ports::NoopEventLog;
    use chrono::Utc;

    fn draft(amount: i64, currency: &str) -> ExpenseDraft {
        ExpenseDraft {
            user_id: "u1".to_string(),
            category_id: "c1".to_string(),
            amount: Decimal::new(amount, 0),
            currency: currency.to_string(),
            title: "Item".to_string(),
            description: String::new(),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_summary_counts_and_totals() {
        let repo = Arc::new(MemoryRepository::new());
        let service = StatusService::new(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            Arc::new(NoopEventLog),
            Locale::En,
        );

        for (amount, currency, status) in [
            (1000, "JPY", Some(ExpenseStatus::Approved)),
            (500, "JPY", Some(ExpenseStatus::Approved)),
            (20, "USD", Some(ExpenseStatus::Approved)),
            (9999, "JPY", Some(ExpenseStatus::Rejected)),
            (300, "JPY", None),
        ] {
            let expense = ExpenseRepository::create(repo.as_ref(), draft(amount, currency))
                .await
                .unwrap();
            if let Some(status) = status {
                repo.update_status(expense.id(), status).await.unwrap();
            }
        }

        let summary = service.summary().await.unwrap();
        assert_eq!(summary.total_users, 0);
        assert_eq!(summary.total_expenses, 5);

        let counts: Vec<(ExpenseStatus, usize)> = summary
            .by_status
            .iter()
            .map(|c| (c.status, c.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (ExpenseStatus::Pending, 1),
                (ExpenseStatus::Approved, 3),
                (ExpenseStatus::Rejected, 1),
            ]
        );

        assert_eq!(summary.approved_totals.len(), 2);
        assert_eq!(summary.approved_totals[0].currency, "JPY");
        assert_eq!(summary.approved_totals[0].amount, Decimal::new(1500, 0));
        assert_eq!(summary.approved_totals[1].currency, "USD");
        assert_eq!(summary.approved_totals[1].amount, Decimal::new(20, 0));
    }
}
