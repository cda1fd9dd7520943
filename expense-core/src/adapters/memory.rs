//! In-memory repository implementation
//!
//! Keeps every entity in a `RwLock<HashMap>`. Nothing survives the process;
//! used for tests and for embedding the core without a database file.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryDraft, Expense, ExpenseChanges, ExpenseDraft, ExpenseRecord, ExpenseStatus,
    User, UserDraft,
};
use crate::ports::{
    CategoryRepository, ExpenseRepository, RepositoryError, RepositoryResult, UserRepository,
};

/// Repository holding users, categories, and expenses in memory
#[derive(Default)]
pub struct MemoryRepository {
    users: RwLock<HashMap<String, User>>,
    categories: RwLock<HashMap<String, Category>>,
    expenses: RwLock<HashMap<String, Expense>>,
}

fn read<T>(lock: &RwLock<T>) -> RepositoryResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| RepositoryError::Transport(format!("Failed to acquire read lock: {}", e)))
}

fn write<T>(lock: &RwLock<T>) -> RepositoryResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| RepositoryError::Transport(format!("Failed to acquire write lock: {}", e)))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Oldest first, ties broken by id so listings are stable
fn sorted_expenses<'a>(iter: impl Iterator<Item = &'a Expense>) -> Vec<Expense> {
    let mut list: Vec<Expense> = iter.cloned().collect();
    list.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(b.id()))
    });
    list
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        let users = read(&self.users)?;
        let mut list: Vec<User> = users.values().cloned().collect();
        list.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(list)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        Ok(read(&self.users)?.get(id).cloned())
    }

    async fn create(&self, draft: UserDraft) -> RepositoryResult<User> {
        let now = Utc::now();
        let user = User::restore(new_id(), draft.name, draft.email, now, now)
            .map_err(RepositoryError::transport)?;
        write(&self.users)?.insert(user.id().to_string(), user.clone());
        Ok(user)
    }

    async fn update(&self, id: &str, draft: UserDraft) -> RepositoryResult<User> {
        let mut users = write(&self.users)?;
        let existing = users
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let user = User::restore(id, draft.name, draft.email, existing.created_at(), Utc::now())
            .map_err(RepositoryError::transport)?;
        users.insert(id.to_string(), user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        write(&self.users)?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl CategoryRepository for MemoryRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Category>> {
        let categories = read(&self.categories)?;
        let mut list: Vec<Category> = categories.values().cloned().collect();
        list.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(list)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Category>> {
        Ok(read(&self.categories)?.get(id).cloned())
    }

    async fn create(&self, draft: CategoryDraft) -> RepositoryResult<Category> {
        let now = Utc::now();
        let category = Category::restore(
            new_id(),
            draft.name,
            draft.description,
            Some(&draft.color),
            now,
            now,
        )
        .map_err(RepositoryError::transport)?;
        write(&self.categories)?.insert(category.id().to_string(), category.clone());
        Ok(category)
    }

    async fn update(&self, id: &str, draft: CategoryDraft) -> RepositoryResult<Category> {
        let mut categories = write(&self.categories)?;
        let existing = categories
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let category = Category::restore(
            id,
            draft.name,
            draft.description,
            Some(&draft.color),
            existing.created_at(),
            Utc::now(),
        )
        .map_err(RepositoryError::transport)?;
        categories.insert(id.to_string(), category.clone());
        Ok(category)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        write(&self.categories)?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl ExpenseRepository for MemoryRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Expense>> {
        Ok(sorted_expenses(read(&self.expenses)?.values()))
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Expense>> {
        Ok(read(&self.expenses)?.get(id).cloned())
    }

    async fn get_by_user_id(&self, user_id: &str) -> RepositoryResult<Vec<Expense>> {
        let expenses = read(&self.expenses)?;
        Ok(sorted_expenses(
            expenses.values().filter(|e| e.user_id() == user_id),
        ))
    }

    async fn get_by_user_and_status(
        &self,
        user_id: &str,
        status: ExpenseStatus,
    ) -> RepositoryResult<Vec<Expense>> {
        let expenses = read(&self.expenses)?;
        Ok(sorted_expenses(
            expenses
                .values()
                .filter(|e| e.user_id() == user_id && e.status() == status),
        ))
    }

    async fn get_by_category_id(&self, category_id: &str) -> RepositoryResult<Vec<Expense>> {
        let expenses = read(&self.expenses)?;
        Ok(sorted_expenses(
            expenses.values().filter(|e| e.category_id() == category_id),
        ))
    }

    async fn create(&self, draft: ExpenseDraft) -> RepositoryResult<Expense> {
        let now = Utc::now();
        let expense = Expense::restore(ExpenseRecord {
            id: new_id(),
            user_id: draft.user_id,
            category_id: draft.category_id,
            amount: draft.amount,
            currency: draft.currency,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            status: ExpenseStatus::Pending,
            created_at: now,
            updated_at: now,
        })
        .map_err(RepositoryError::transport)?;
        write(&self.expenses)?.insert(expense.id().to_string(), expense.clone());
        Ok(expense)
    }

    async fn update(&self, id: &str, changes: ExpenseChanges) -> RepositoryResult<Expense> {
        let mut expenses = write(&self.expenses)?;
        let existing = expenses
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let expense = Expense::restore(ExpenseRecord {
            id: id.to_string(),
            user_id: existing.user_id().to_string(),
            category_id: changes.category_id,
            amount: changes.amount,
            currency: changes.currency,
            title: changes.title,
            description: changes.description,
            date: changes.date,
            status: existing.status(),
            created_at: existing.created_at(),
            updated_at: Utc::now(),
        })
        .map_err(RepositoryError::transport)?;
        expenses.insert(id.to_string(), expense.clone());
        Ok(expense)
    }

    async fn update_status(&self, id: &str, status: ExpenseStatus) -> RepositoryResult<Expense> {
        let mut expenses = write(&self.expenses)?;
        let existing = expenses
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        let expense = Expense::restore(ExpenseRecord {
            id: id.to_string(),
            user_id: existing.user_id().to_string(),
            category_id: existing.category_id().to_string(),
            amount: existing.amount(),
            currency: existing.currency().to_string(),
            title: existing.title().to_string(),
            description: existing.description().to_string(),
            date: existing.date(),
            status,
            created_at: existing.created_at(),
            updated_at: Utc::now(),
        })
        .map_err(RepositoryError::transport)?;
        expenses.insert(id.to_string(), expense.clone());
        Ok(expense)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        write(&self.expenses)?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn expense_draft(user_id: &str, category_id: &str) -> ExpenseDraft {
        ExpenseDraft {
            user_id: user_id.to_string(),
            category_id: category_id.to_string(),
            amount: Decimal::new(2500, 0),
            currency: "JPY".to_string(),
            title: "Books".to_string(),
            description: String::new(),
            date: Utc::now() - Duration::days(2),
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let repo = MemoryRepository::new();
        let user = UserRepository::create(
            &repo,
            UserDraft {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
        )
        .await
        .unwrap();

        let fetched = UserRepository::get_by_id(&repo, user.id()).await.unwrap();
        assert_eq!(fetched.as_ref().map(|u| u.name()), Some("Alice"));

        let updated = UserRepository::update(
            &repo,
            user.id(),
            UserDraft {
                name: "Alicia".to_string(),
                email: "alicia@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name(), "Alicia");
        assert_eq!(updated.created_at(), user.created_at());

        UserRepository::delete(&repo, user.id()).await.unwrap();
        assert!(UserRepository::get_by_id(&repo, user.id())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_writes_against_missing_id() {
        let repo = MemoryRepository::new();
        assert_eq!(
            ExpenseRepository::update_status(&repo, "nope", ExpenseStatus::Approved).await,
            Err(RepositoryError::NotFound("nope".to_string()))
        );
        assert_eq!(
            CategoryRepository::delete(&repo, "nope").await,
            Err(RepositoryError::NotFound("nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_expense_filters() {
        let repo = MemoryRepository::new();
        let first = ExpenseRepository::create(&repo, expense_draft("u1", "c1"))
            .await
            .unwrap();
        ExpenseRepository::create(&repo, expense_draft("u1", "c2"))
            .await
            .unwrap();
        ExpenseRepository::create(&repo, expense_draft("u2", "c1"))
            .await
            .unwrap();
        assert_eq!(first.status(), ExpenseStatus::Pending);

        ExpenseRepository::update_status(&repo, first.id(), ExpenseStatus::Approved)
            .await
            .unwrap();

        assert_eq!(repo.get_by_user_id("u1").await.unwrap().len(), 2);
        assert_eq!(repo.get_by_category_id("c1").await.unwrap().len(), 2);

        let approved = repo
            .get_by_user_and_status("u1", ExpenseStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id(), first.id());
    }
}
