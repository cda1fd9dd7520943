//! Summary command - counts and approved totals

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use expense_core::domain::messages::no_approved_message;

use super::{get_context, report, Logger};
use crate::output;

pub async fn run(json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let locale = ctx.locale();
    let result = ctx.status_service.summary().await;

    report(result, locale, json, |summary| {
        println!("{}", "Expense Summary".bold());
        println!();

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec!["Users", &summary.total_users.to_string()]);
        table.add_row(vec!["Categories", &summary.total_categories.to_string()]);
        table.add_row(vec!["Expenses", &summary.total_expenses.to_string()]);
        for count in &summary.by_status {
            table.add_row(vec![
                format!("  {}", output::status_label(count.status, locale)),
                count.count.to_string(),
            ]);
        }
        println!("{}", table);
        println!();

        if summary.approved_totals.is_empty() {
            output::info(&no_approved_message(locale));
            return;
        }

        println!("{}", "Approved Totals".bold());
        for total in &summary.approved_totals {
            println!("  {} {}", total.amount, total.currency);
        }
    })
}
