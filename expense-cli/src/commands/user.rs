//! User commands - register and manage expense submitters

use anyhow::Result;
use clap::Subcommand;

use expense_core::domain::result::Result as CoreResult;
use expense_core::domain::messages::{cancelled_message, notice_message};
use expense_core::domain::{EntityKind, Notice};
use expense_core::{Error, User, UserInput};

use super::{confirm, get_context, prompt_if_missing, report, Logger};
use crate::output;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single user
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a user's name or email
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a user
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

impl UserCommands {
    pub fn name(&self) -> &'static str {
        match self {
            UserCommands::Add { .. } => "user add",
            UserCommands::List { .. } => "user list",
            UserCommands::Show { .. } => "user show",
            UserCommands::Update { .. } => "user update",
            UserCommands::Remove { .. } => "user remove",
        }
    }
}

fn print_user(user: &User) {
    println!("  ID:      {}", user.id());
    println!("  Name:    {}", user.name());
    println!("  Email:   {}", user.email());
    println!("  Created: {}", user.created_at().format("%Y-%m-%d %H:%M"));
}

pub async fn run(command: UserCommands, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let locale = ctx.locale();
    let users = &ctx.user_service;

    match command {
        UserCommands::Add { name, email, json } => {
            let name = prompt_if_missing(name, "Name")?;
            let email = prompt_if_missing(email, "Email")?;
            let result = users.create(UserInput::new(name, email)).await;
            report(result, locale, json, |user| {
                output::success(&notice_message(EntityKind::User, Notice::Created, locale));
                print_user(&user);
            })
        }
        UserCommands::List { json } => {
            let result = users.list().await;
            report(result, locale, json, |list| {
                if list.is_empty() {
                    println!("{}", notice_message(EntityKind::User, Notice::NoneFound, locale));
                    return;
                }
                let mut table = output::create_table();
                table.set_header(vec!["ID", "Name", "Email"]);
                for user in &list {
                    table.add_row(vec![user.id(), user.name(), user.email()]);
                }
                println!("{}", table);
            })
        }
        UserCommands::Show { id, json } => {
            let result = users
                .get(&id)
                .await
                .and_then(|user| user.ok_or_else(|| Error::not_found(EntityKind::User, &id)));
            report(result, locale, json, |user| print_user(&user))
        }
        UserCommands::Update {
            id,
            name,
            email,
            json,
        } => {
            let result: CoreResult<User> = async {
                let current = users
                    .get(&id)
                    .await?
                    .ok_or_else(|| Error::not_found(EntityKind::User, &id))?;
                let input = UserInput::new(
                    name.unwrap_or_else(|| current.name().to_string()),
                    email.unwrap_or_else(|| current.email().to_string()),
                );
                users.update(&id, input).await
            }
            .await;
            report(result, locale, json, |user| {
                output::success(&notice_message(EntityKind::User, Notice::Updated, locale));
                print_user(&user);
            })
        }
        UserCommands::Remove { id, force, json } => {
            let prompt = notice_message(EntityKind::User, Notice::ConfirmRemove, locale);
            if !force && !json && !confirm(&format!("{} ({})", prompt, id))? {
                println!("{}", cancelled_message(locale));
                return Ok(());
            }
            let result = users.delete(&id).await;
            report(result, locale, json, |()| {
                let removed = notice_message(EntityKind::User, Notice::Removed, locale);
                output::success(&format!("{}: {}", removed, id));
            })
        }
    }
}
