//! Expense commands - submit, edit, and review expenses

use std::io::{self, Read};
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Input;
use rust_decimal::Decimal;
use serde::Serialize;

use expense_core::domain::result::Result as CoreResult;
use expense_core::domain::messages::{
    cancelled_message, notice_message, review_failed_message, reviewed_message,
};
use expense_core::domain::{EntityKind, ExpenseAction, Notice};
use expense_core::{Error, Expense, ExpenseContext, ExpenseInput, ExpenseStatus, Locale};

use super::{confirm, get_context, prompt_if_missing, report, Logger};
use crate::output;

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Submit a new expense
    Add {
        /// Submitting user ID
        #[arg(long)]
        user: Option<String>,
        /// Category ID
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        /// Currency code (defaults to the configured currency)
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Date (YYYY-MM-DD or RFC 3339), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List expenses, optionally for one user and status
    List {
        #[arg(long)]
        user: Option<String>,
        /// pending, approved, or rejected
        #[arg(long, requires = "user")]
        status: Option<ExpenseStatus>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single expense
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a pending expense; omitted fields keep their current value
    Update {
        id: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an expense
    Remove {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Approve pending expenses
    Approve {
        /// Expense IDs (read from stdin when omitted)
        ids: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reject pending expenses
    Reject {
        /// Expense IDs (read from stdin when omitted)
        ids: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl ExpenseCommands {
    pub fn name(&self) -> &'static str {
        match self {
            ExpenseCommands::Add { .. } => "expense add",
            ExpenseCommands::List { .. } => "expense list",
            ExpenseCommands::Show { .. } => "expense show",
            ExpenseCommands::Update { .. } => "expense update",
            ExpenseCommands::Remove { .. } => "expense remove",
            ExpenseCommands::Approve { .. } => "expense approve",
            ExpenseCommands::Reject { .. } => "expense reject",
        }
    }
}

/// Outcome of approving or rejecting a batch of expenses
#[derive(Debug, Serialize)]
struct BatchResult {
    succeeded: usize,
    failed: usize,
    results: Vec<BatchEntry>,
}

#[derive(Debug, Serialize)]
struct BatchEntry {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<ExpenseStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn parse_amount(value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| anyhow!("Invalid amount: {}", value))
}

/// Today's date in the local timezone, as YYYY-MM-DD
/// Stored dates are instants; show them on the local calendar they were entered on
fn display_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Accepts YYYY-MM-DD (local midnight) or a full RFC 3339 timestamp
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date format. Use YYYY-MM-DD"))?;
    // Earliest instant of the day, which also covers days that start in a DST gap
    let midnight = Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&date.and_hms_opt(1, 0, 0)?)
                .earliest()
        })
        .ok_or_else(|| anyhow!("{} has no valid local midnight", value))?;
    Ok(midnight.with_timezone(&Utc))
}

/// IDs from arguments, or one per line (or comma separated) on stdin
fn read_ids(ids: Vec<String>) -> Result<Vec<String>> {
    if !ids.is_empty() || atty::is(atty::Stream::Stdin) {
        return Ok(ids);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    let separator = if trimmed.contains('\n') { '\n' } else { ',' };
    Ok(trimmed
        .split(separator)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn print_expense(expense: &Expense, locale: Locale) {
    println!("  ID:          {}", expense.id());
    println!("  Title:       {}", expense.title());
    println!("  Amount:      {} {}", expense.amount(), expense.currency());
    println!("  Date:        {}", display_date(expense.date()));
    println!("  Status:      {}", output::status_label(expense.status(), locale));
    println!("  User:        {}", expense.user_id());
    println!("  Category:    {}", expense.category_id());
    if !expense.description().is_empty() {
        println!("  Description: {}", expense.description());
    }
}

fn print_expense_table(expenses: &[Expense], locale: Locale) {
    if expenses.is_empty() {
        println!("{}", notice_message(EntityKind::Expense, Notice::NoneFound, locale));
        return;
    }
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "Title", "Amount", "Status", "User", "Category"]);
    for expense in expenses {
        table.add_row(vec![
            expense.id().to_string(),
            display_date(expense.date()),
            expense.title().to_string(),
            format!("{} {}", expense.amount(), expense.currency()),
            output::status_label(expense.status(), locale).to_string(),
            expense.user_id().to_string(),
            expense.category_id().to_string(),
        ]);
    }
    println!("{}", table);
}

pub async fn run(command: ExpenseCommands, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let locale = ctx.locale();
    let expenses = &ctx.expense_service;

    match command {
        ExpenseCommands::Add {
            user,
            category,
            amount,
            currency,
            title,
            description,
            date,
            json,
        } => {
            let user_id = prompt_if_missing(user, "User ID")?;
            let category_id = prompt_if_missing(category, "Category ID")?;
            let amount = parse_amount(&prompt_if_missing(amount, "Amount")?)?;
            let title = prompt_if_missing(title, "Title")?;
            let date = match date {
                Some(d) => d,
                None => Input::<String>::new()
                    .with_prompt("Date")
                    .default(today())
                    .interact_text()?,
            };

            let input = ExpenseInput {
                category_id,
                amount: Some(amount),
                currency,
                title,
                description: description.unwrap_or_default(),
                date: Some(parse_date(&date)?),
            };
            let result = expenses.create(&user_id, input).await;
            report(result, locale, json, |expense| {
                output::success(&notice_message(EntityKind::Expense, Notice::Created, locale));
                print_expense(&expense, locale);
            })
        }
        ExpenseCommands::List { user, status, json } => {
            let result = match (user, status) {
                (Some(user_id), Some(status)) => {
                    expenses.list_by_user_and_status(&user_id, status).await
                }
                (Some(user_id), None) => expenses.list_by_user(&user_id).await,
                (None, _) => expenses.list().await,
            };
            report(result, locale, json, |list| print_expense_table(&list, locale))
        }
        ExpenseCommands::Show { id, json } => {
            let result = expenses.get(&id).await.and_then(|expense| {
                expense.ok_or_else(|| Error::not_found(EntityKind::Expense, &id))
            });
            report(result, locale, json, |expense| print_expense(&expense, locale))
        }
        ExpenseCommands::Update {
            id,
            category,
            amount,
            currency,
            title,
            description,
            date,
            json,
        } => {
            let amount = amount.as_deref().map(parse_amount).transpose()?;
            let date = date.as_deref().map(parse_date).transpose()?;

            let result: CoreResult<Expense> = async {
                let current = expenses
                    .get(&id)
                    .await?
                    .ok_or_else(|| Error::not_found(EntityKind::Expense, &id))?;
                let input = ExpenseInput {
                    category_id: category.unwrap_or_else(|| current.category_id().to_string()),
                    amount: Some(amount.unwrap_or(current.amount())),
                    currency: Some(currency.unwrap_or_else(|| current.currency().to_string())),
                    title: title.unwrap_or_else(|| current.title().to_string()),
                    description: description.unwrap_or_else(|| current.description().to_string()),
                    date: Some(date.unwrap_or(current.date())),
                };
                expenses.update(&id, input).await
            }
            .await;
            report(result, locale, json, |expense| {
                output::success(&notice_message(EntityKind::Expense, Notice::Updated, locale));
                print_expense(&expense, locale);
            })
        }
        ExpenseCommands::Remove { id, force, json } => {
            let prompt = notice_message(EntityKind::Expense, Notice::ConfirmRemove, locale);
            if !force && !json && !confirm(&format!("{} ({})", prompt, id))? {
                println!("{}", cancelled_message(locale));
                return Ok(());
            }
            let result = expenses.delete(&id).await;
            report(result, locale, json, |()| {
                let removed = notice_message(EntityKind::Expense, Notice::Removed, locale);
                output::success(&format!("{}: {}", removed, id));
            })
        }
        ExpenseCommands::Approve { ids, json } => {
            run_transition(&ctx, ids, ExpenseAction::Approve, json).await
        }
        ExpenseCommands::Reject { ids, json } => {
            run_transition(&ctx, ids, ExpenseAction::Reject, json).await
        }
    }
}

async fn run_transition(
    ctx: &ExpenseContext,
    ids: Vec<String>,
    action: ExpenseAction,
    json: bool,
) -> Result<()> {
    let id_list = read_ids(ids)?;
    if id_list.is_empty() {
        bail!("No expense IDs provided. Pass IDs as arguments or pipe them from stdin.");
    }

    let locale = ctx.locale();
    let mut batch = BatchResult {
        succeeded: 0,
        failed: 0,
        results: Vec::with_capacity(id_list.len()),
    };

    for id in id_list {
        let outcome = match action {
            ExpenseAction::Approve => ctx.expense_service.approve(&id).await,
            ExpenseAction::Reject => ctx.expense_service.reject(&id).await,
            ExpenseAction::Edit => bail!("Editing is not a review action"),
        };
        let entry = match outcome {
            Ok(expense) => {
                batch.succeeded += 1;
                BatchEntry {
                    id,
                    status: Some(expense.status()),
                    error: None,
                }
            }
            Err(e) => {
                batch.failed += 1;
                BatchEntry {
                    id,
                    status: None,
                    error: Some(e.user_message(locale)),
                }
            }
        };
        batch.results.push(entry);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        if batch.succeeded > 0 {
            println!(
                "{} {}",
                "✓".green(),
                reviewed_message(action, batch.succeeded, locale)
            );
        }
        if batch.failed > 0 {
            println!();
            println!(
                "{} {}",
                "✗".red(),
                review_failed_message(action, batch.failed, locale)
            );
            for entry in &batch.results {
                if let Some(error) = &entry.error {
                    println!("  {}: {}", entry.id, error);
                }
            }
        }
    }

    if batch.failed > 0 {
        bail!(
            "{} ({}/{})",
            review_failed_message(action, batch.failed, locale),
            batch.failed,
            batch.results.len()
        );
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use expense_core::domain::validation::validate_date;

    #[test]
    fn test_parse_date_plain_is_local_midnight() {
        let date = parse_date("2024-03-15").unwrap();
        let local = date.with_timezone(&Local);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(local.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_default_date_is_not_in_future() {
        let date = parse_date(&today()).unwrap();
        assert!(validate_date(Some(date), Utc::now()).is_empty());
    }

    #[test]
    fn test_plain_date_displays_unchanged() {
        let date = parse_date("2024-03-15").unwrap();
        assert_eq!(display_date(date), "2024-03-15");
    }

    #[test]
    fn test_parse_date_rfc3339() {
        let date = parse_date("2024-03-15T09:30:00+09:00").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-15T00:30:00+00:00");
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 1200.50 ").unwrap(), Decimal::new(120050, 2));
        assert!(parse_amount("abc").is_err());
    }
}
