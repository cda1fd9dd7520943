//! Category commands

use anyhow::Result;
use clap::Subcommand;

use expense_core::domain::result::Result as CoreResult;
use expense_core::domain::messages::{cancelled_message, notice_message};
use expense_core::domain::{EntityKind, Notice};
use expense_core::{Category, CategoryInput, Error};

use super::{confirm, get_context, prompt_if_missing, report, Logger};
use crate::output;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Hex color such as #10b981
        #[arg(long)]
        color: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all categories
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single category
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a category; omitted fields keep their current value
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a category that no expense uses
    Remove {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl CategoryCommands {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryCommands::Add { .. } => "category add",
            CategoryCommands::List { .. } => "category list",
            CategoryCommands::Show { .. } => "category show",
            CategoryCommands::Update { .. } => "category update",
            CategoryCommands::Remove { .. } => "category remove",
        }
    }
}

fn print_category(category: &Category) {
    println!("  ID:          {}", category.id());
    println!("  Name:        {}", category.name());
    if !category.description().is_empty() {
        println!("  Description: {}", category.description());
    }
    println!("  Color:       {}", category.color());
}

pub async fn run(command: CategoryCommands, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let locale = ctx.locale();
    let categories = &ctx.category_service;

    match command {
        CategoryCommands::Add {
            name,
            description,
            color,
            json,
        } => {
            let input = CategoryInput {
                name: prompt_if_missing(name, "Name")?,
                description,
                color,
            };
            let result = categories.create(input).await;
            report(result, locale, json, |category| {
                output::success(&notice_message(EntityKind::Category, Notice::Created, locale));
                print_category(&category);
            })
        }
        CategoryCommands::List { json } => {
            let result = categories.list().await;
            report(result, locale, json, |list| {
                if list.is_empty() {
                    println!(
                        "{}",
                        notice_message(EntityKind::Category, Notice::NoneFound, locale)
                    );
                    return;
                }
                let mut table = output::create_table();
                table.set_header(vec!["ID", "Name", "Color", "Description"]);
                for category in &list {
                    table.add_row(vec![
                        category.id(),
                        category.name(),
                        category.color(),
                        category.description(),
                    ]);
                }
                println!("{}", table);
            })
        }
        CategoryCommands::Show { id, json } => {
            let result = categories.get(&id).await.and_then(|category| {
                category.ok_or_else(|| Error::not_found(EntityKind::Category, &id))
            });
            report(result, locale, json, |category| print_category(&category))
        }
        CategoryCommands::Update {
            id,
            name,
            description,
            color,
            json,
        } => {
            let result: CoreResult<Category> = async {
                let current = categories
                    .get(&id)
                    .await?
                    .ok_or_else(|| Error::not_found(EntityKind::Category, &id))?;
                let input = CategoryInput {
                    name: name.unwrap_or_else(|| current.name().to_string()),
                    description: description.or_else(|| Some(current.description().to_string())),
                    color: color.or_else(|| Some(current.color().to_string())),
                };
                categories.update(&id, input).await
            }
            .await;
            report(result, locale, json, |category| {
                output::success(&notice_message(EntityKind::Category, Notice::Updated, locale));
                print_category(&category);
            })
        }
        CategoryCommands::Remove { id, force, json } => {
            let prompt = notice_message(EntityKind::Category, Notice::ConfirmRemove, locale);
            if !force && !json && !confirm(&format!("{} ({})", prompt, id))? {
                println!("{}", cancelled_message(locale));
                return Ok(());
            }
            let result = categories.delete(&id).await;
            report(result, locale, json, |()| {
                let removed = notice_message(EntityKind::Category, Notice::Removed, locale);
                output::success(&format!("{}: {}", removed, id));
            })
        }
    }
}
