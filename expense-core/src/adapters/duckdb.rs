//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use duckdb::{params, Connection, ToSql};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryDraft, Expense, ExpenseChanges, ExpenseDraft, ExpenseRecord, ExpenseStatus,
    User, UserDraft,
};
use crate::ports::{
    CategoryRepository, ExpenseRepository, RepositoryError, RepositoryResult, UserRepository,
};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

const CATEGORY_COLUMNS: &str = "id, name, description, color, created_at, updated_at";

const EXPENSE_COLUMNS: &str = "id, user_id, category_id, amount::VARCHAR, currency, title, \
                               description, date, status, created_at, updated_at";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// DuckDB-backed store for users, categories, and expenses
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file at `db_path`.
    ///
    /// Retries with exponential backoff on file locking errors, which show up
    /// when another process is opening the same file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[expense] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// A throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; cached extensions in ~/.duckdb can
        // fail code signing checks on macOS.
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;
        Ok(conn)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run any pending migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    // === Users ===

    pub fn get_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_user_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        Self::fetch_user(&conn, id)
    }

    fn fetch_user(conn: &Connection, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map([id], read_user_row)?;
        let row = rows.next().transpose()?;
        row.map(UserRow::into_user).transpose()
    }

    pub fn create_user(&self, draft: UserDraft) -> Result<User> {
        let now = Utc::now();
        let user = User::restore(Uuid::new_v4().to_string(), draft.name, draft.email, now, now)
            .map_err(|v| anyhow!("Invalid user: {}", v))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, name, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                user.id(),
                user.name(),
                user.email(),
                format_timestamp(user.created_at()),
                format_timestamp(user.updated_at()),
            ],
        )?;
        Ok(user)
    }

    /// `Ok(None)` when no user has this id
    pub fn update_user(&self, id: &str, draft: UserDraft) -> Result<Option<User>> {
        let conn = self.conn()?;
        let Some(existing) = Self::fetch_user(&conn, id)? else {
            return Ok(None);
        };
        let user = User::restore(id, draft.name, draft.email, existing.created_at(), Utc::now())
            .map_err(|v| anyhow!("Invalid user: {}", v))?;

        conn.execute(
            "UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ?",
            params![
                user.name(),
                user.email(),
                format_timestamp(user.updated_at()),
                id
            ],
        )?;
        Ok(Some(user))
    }

    /// Returns whether a row was deleted
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    // === Categories ===

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM categories ORDER BY created_at, id",
            CATEGORY_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_category_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        rows.into_iter().map(CategoryRow::into_category).collect()
    }

    pub fn get_category(&self, id: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        Self::fetch_category(&conn, id)
    }

    fn fetch_category(conn: &Connection, id: &str) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map([id], read_category_row)?;
        let row = rows.next().transpose()?;
        row.map(CategoryRow::into_category).transpose()
    }

    pub fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        let now = Utc::now();
        let category = Category::restore(
            Uuid::new_v4().to_string(),
            draft.name,
            draft.description,
            Some(&draft.color),
            now,
            now,
        )
        .map_err(|v| anyhow!("Invalid category: {}", v))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (id, name, description, color, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                category.id(),
                category.name(),
                category.description(),
                category.color(),
                format_timestamp(category.created_at()),
                format_timestamp(category.updated_at()),
            ],
        )?;
        Ok(category)
    }

    pub fn update_category(&self, id: &str, draft: CategoryDraft) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let Some(existing) = Self::fetch_category(&conn, id)? else {
            return Ok(None);
        };
        let category = Category::restore(
            id,
            draft.name,
            draft.description,
            Some(&draft.color),
            existing.created_at(),
            Utc::now(),
        )
        .map_err(|v| anyhow!("Invalid category: {}", v))?;

        conn.execute(
            "UPDATE categories SET name = ?, description = ?, color = ?, updated_at = ?
             WHERE id = ?",
            params![
                category.name(),
                category.description(),
                category.color(),
                format_timestamp(category.updated_at()),
                id
            ],
        )?;
        Ok(Some(category))
    }

    pub fn delete_category(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM categories WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }

    // === Expenses ===

    fn query_expenses(
        conn: &Connection,
        filter: &str,
        args: &[&dyn ToSql],
    ) -> Result<Vec<Expense>> {
        let sql = format!(
            "SELECT {} FROM expenses {} ORDER BY created_at, id",
            EXPENSE_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(args, read_expense_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;
        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    pub fn get_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        Self::query_expenses(&conn, "", &[])
    }

    pub fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        Self::fetch_expense(&conn, id)
    }

    fn fetch_expense(conn: &Connection, id: &str) -> Result<Option<Expense>> {
        Ok(Self::query_expenses(conn, "WHERE id = ?", &[&id])?
            .into_iter()
            .next())
    }

    pub fn get_expenses_by_user(&self, user_id: &str) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        Self::query_expenses(&conn, "WHERE user_id = ?", &[&user_id])
    }

    pub fn get_expenses_by_user_and_status(
        &self,
        user_id: &str,
        status: ExpenseStatus,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        Self::query_expenses(
            &conn,
            "WHERE user_id = ? AND status = ?",
            &[&user_id, &status.as_str()],
        )
    }

    pub fn get_expenses_by_category(&self, category_id: &str) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        Self::query_expenses(&conn, "WHERE category_id = ?", &[&category_id])
    }

    pub fn create_expense(&self, draft: ExpenseDraft) -> Result<Expense> {
        let now = Utc::now();
        let expense = Expense::restore(ExpenseRecord {
            id: Uuid::new_v4().to_string(),
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
        .map_err(|v| anyhow!("Invalid expense: {}", v))?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO expenses (
                id, user_id, category_id, amount, currency, title, description,
                date, status, created_at, updated_at
             ) VALUES (?, ?, ?, CAST(? AS DECIMAL(18, 4)), ?, ?, ?, ?, ?, ?, ?)",
            params![
                expense.id(),
                expense.user_id(),
                expense.category_id(),
                expense.amount().to_string(),
                expense.currency(),
                expense.title(),
                expense.description(),
                format_timestamp(expense.date()),
                expense.status().as_str(),
                format_timestamp(expense.created_at()),
                format_timestamp(expense.updated_at()),
            ],
        )?;
        Ok(expense)
    }

    pub fn update_expense(&self, id: &str, changes: ExpenseChanges) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let Some(existing) = Self::fetch_expense(&conn, id)? else {
            return Ok(None);
        };
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
        .map_err(|v| anyhow!("Invalid expense: {}", v))?;

        conn.execute(
            "UPDATE expenses SET
                category_id = ?, amount = CAST(? AS DECIMAL(18, 4)), currency = ?,
                title = ?, description = ?, date = ?, updated_at = ?
             WHERE id = ?",
            params![
                expense.category_id(),
                expense.amount().to_string(),
                expense.currency(),
                expense.title(),
                expense.description(),
                format_timestamp(expense.date()),
                format_timestamp(expense.updated_at()),
                id
            ],
        )?;
        Ok(Some(expense))
    }

    pub fn update_expense_status(
        &self,
        id: &str,
        status: ExpenseStatus,
    ) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let updated_at = format_timestamp(Utc::now());
        let changed = conn.execute(
            "UPDATE expenses SET status = ?, updated_at = ? WHERE id = ?",
            params![status.as_str(), updated_at, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::fetch_expense(&conn, id)
    }

    pub fn delete_expense(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM expenses WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }
}

// === Row mapping ===

struct UserRow {
    id: String,
    name: String,
    email: String,
    created_at: String,
    updated_at: String,
}

fn read_user_row(row: &duckdb::Row) -> duckdb::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let id = self.id.clone();
        User::restore(
            self.id,
            self.name,
            self.email,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        )
        .map_err(|v| anyhow!("Stored user {} is invalid: {}", id, v))
    }
}

struct CategoryRow {
    id: String,
    name: String,
    description: String,
    color: String,
    created_at: String,
    updated_at: String,
}

fn read_category_row(row: &duckdb::Row) -> duckdb::Result<CategoryRow> {
    Ok(CategoryRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl CategoryRow {
    fn into_category(self) -> Result<Category> {
        let id = self.id.clone();
        Category::restore(
            self.id,
            self.name,
            self.description,
            Some(&self.color),
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        )
        .map_err(|v| anyhow!("Stored category {} is invalid: {}", id, v))
    }
}

struct ExpenseRow {
    id: String,
    user_id: String,
    category_id: String,
    amount: String,
    currency: String,
    title: String,
    description: String,
    date: String,
    status: String,
    created_at: String,
    updated_at: String,
}

fn read_expense_row(row: &duckdb::Row) -> duckdb::Result<ExpenseRow> {
    Ok(ExpenseRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        date: row.get(7)?,
        status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl ExpenseRow {
    fn into_expense(self) -> Result<Expense> {
        let amount = Decimal::from_str(&self.amount)
            .with_context(|| format!("Invalid amount {:?}", self.amount))?
            .normalize();
        let status = ExpenseStatus::from_str(&self.status).map_err(|e| anyhow!(e))?;
        let id = self.id.clone();

        Expense::restore(ExpenseRecord {
            id: self.id,
            user_id: self.user_id,
            category_id: self.category_id,
            amount,
            currency: self.currency,
            title: self.title,
            description: self.description,
            date: parse_timestamp(&self.date)?,
            status,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
        .map_err(|v| anyhow!("Stored expense {} is invalid: {}", id, v))
    }
}

/// Fixed-width RFC 3339 so stored values sort lexically
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp {:?}", s))
}

// === Port implementations ===

#[async_trait]
impl UserRepository for DuckDbRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<User>> {
        self.get_users().map_err(RepositoryError::transport)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<User>> {
        self.get_user(id).map_err(RepositoryError::transport)
    }

    async fn create(&self, draft: UserDraft) -> RepositoryResult<User> {
        self.create_user(draft).map_err(RepositoryError::transport)
    }

    async fn update(&self, id: &str, draft: UserDraft) -> RepositoryResult<User> {
        self.update_user(id, draft)
            .map_err(RepositoryError::transport)?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        match self.delete_user(id).map_err(RepositoryError::transport)? {
            true => Ok(()),
            false => Err(RepositoryError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl CategoryRepository for DuckDbRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Category>> {
        self.get_categories().map_err(RepositoryError::transport)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Category>> {
        self.get_category(id).map_err(RepositoryError::transport)
    }

    async fn create(&self, draft: CategoryDraft) -> RepositoryResult<Category> {
        self.create_category(draft)
            .map_err(RepositoryError::transport)
    }

    async fn update(&self, id: &str, draft: CategoryDraft) -> RepositoryResult<Category> {
        self.update_category(id, draft)
            .map_err(RepositoryError::transport)?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        match self
            .delete_category(id)
            .map_err(RepositoryError::transport)?
        {
            true => Ok(()),
            false => Err(RepositoryError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl ExpenseRepository for DuckDbRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Expense>> {
        self.get_expenses().map_err(RepositoryError::transport)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<Option<Expense>> {
        self.get_expense(id).map_err(RepositoryError::transport)
    }

    async fn get_by_user_id(&self, user_id: &str) -> RepositoryResult<Vec<Expense>> {
        self.get_expenses_by_user(user_id)
            .map_err(RepositoryError::transport)
    }

    async fn get_by_user_and_status(
        &self,
        user_id: &str,
        status: ExpenseStatus,
    ) -> RepositoryResult<Vec<Expense>> {
        self.get_expenses_by_user_and_status(user_id, status)
            .map_err(RepositoryError::transport)
    }

    async fn get_by_category_id(&self, category_id: &str) -> RepositoryResult<Vec<Expense>> {
        self.get_expenses_by_category(category_id)
            .map_err(RepositoryError::transport)
    }

    async fn create(&self, draft: ExpenseDraft) -> RepositoryResult<Expense> {
        self.create_expense(draft).map_err(RepositoryError::transport)
    }

    async fn update(&self, id: &str, changes: ExpenseChanges) -> RepositoryResult<Expense> {
        self.update_expense(id, changes)
            .map_err(RepositoryError::transport)?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn update_status(&self, id: &str, status: ExpenseStatus) -> RepositoryResult<Expense> {
        self.update_expense_status(id, status)
            .map_err(RepositoryError::transport)?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        match self.delete_expense(id).map_err(RepositoryError::transport)? {
            true => Ok(()),
            false => Err(RepositoryError::NotFound(id.to_string())),
        }
    }
}
