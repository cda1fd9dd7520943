//! User-facing message catalog
//!
//! Violations and failures are carried as typed codes through the core and
//! only turned into text here, in the locale the caller asks for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::status::{ExpenseAction, ExpenseStatus};
use super::validation::{Field, Rule, Violation};

/// Supported message languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en_us" | "english" => Ok(Locale::En),
            "ja" | "ja-jp" | "ja_jp" | "japanese" => Ok(Locale::Ja),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of entity an operation or failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Category,
    Expense,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Category => "category",
            EntityKind::Expense => "expense",
        }
    }

    fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, EntityKind::User) => "user",
            (Locale::En, EntityKind::Category) => "category",
            (Locale::En, EntityKind::Expense) => "expense",
            (Locale::Ja, EntityKind::User) => "ユーザー",
            (Locale::Ja, EntityKind::Category) => "カテゴリ",
            (Locale::Ja, EntityKind::Expense) => "経費",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a service was doing when a repository call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Fetch,
    Create,
    Update,
    Delete,
    Approve,
    Reject,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Fetch => "fetch",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Reject => "reject",
        }
    }

    fn label_ja(&self) -> &'static str {
        match self {
            Action::Fetch => "取得",
            Action::Create => "作成",
            Action::Update => "更新",
            Action::Delete => "削除",
            Action::Approve => "承認",
            Action::Reject => "却下",
        }
    }
}

/// A service operation, used for generic failure messages and log context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub action: Action,
    pub entity: EntityKind,
}

impl Operation {
    pub const fn new(action: Action, entity: EntityKind) -> Self {
        Self { action, entity }
    }

    /// Stable identifier such as `create_expense`
    pub fn name(&self) -> String {
        format!("{}_{}", self.action.as_str(), self.entity.as_str())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action.as_str(), self.entity.as_str())
    }
}

/// Render a single violation
pub fn violation_message(violation: &Violation, locale: Locale) -> String {
    match locale {
        Locale::En => violation_message_en(violation),
        Locale::Ja => violation_message_ja(violation),
    }
}

fn violation_message_en(v: &Violation) -> String {
    match (v.field, v.rule) {
        (Field::Id, _) => "ID is required".to_string(),
        (Field::UserId, _) => "User ID is required".to_string(),
        (Field::CategoryId, _) => "Category is required".to_string(),

        (Field::UserName, Rule::TooLong { max }) => {
            format!("User name must be {} characters or less", max)
        }
        (Field::UserName, _) => "User name is required".to_string(),
        (Field::Email, Rule::Required) => "Email is required".to_string(),
        (Field::Email, _) => "Invalid email format".to_string(),

        (Field::CategoryName, Rule::TooLong { max }) => {
            format!("Category name must be {} characters or less", max)
        }
        (Field::CategoryName, _) => "Category name is required".to_string(),
        (Field::CategoryDescription, Rule::TooLong { max }) => {
            format!("Category description must be {} characters or less", max)
        }
        (Field::CategoryDescription, _) => "Invalid category description".to_string(),
        (Field::Color, _) => "Invalid color format".to_string(),

        (Field::Amount, Rule::NotPositive) => "Amount must be greater than 0".to_string(),
        (Field::Amount, Rule::ExceedsLimit) => "Amount must be 10,000,000 or less".to_string(),
        (Field::Amount, _) => "Amount is required".to_string(),
        (Field::Currency, _) => "Currency is required".to_string(),
        (Field::Title, Rule::TooLong { max }) => {
            format!("Title must be {} characters or less", max)
        }
        (Field::Title, _) => "Title is required".to_string(),
        (Field::ExpenseDescription, Rule::TooLong { max }) => {
            format!("Description must be {} characters or less", max)
        }
        (Field::ExpenseDescription, _) => "Invalid description".to_string(),
        (Field::Date, Rule::InFuture) => "Date cannot be in the future".to_string(),
        (Field::Date, _) => "Date is required".to_string(),
    }
}

fn violation_message_ja(v: &Violation) -> String {
    match (v.field, v.rule) {
        (Field::Id, _) => "IDは必須です".to_string(),
        (Field::UserId, _) => "ユーザーIDは必須です".to_string(),
        (Field::CategoryId, _) => "カテゴリは必須です".to_string(),

        (Field::UserName, Rule::TooLong { max }) => {
            format!("ユーザー名は{}文字以内で入力してください", max)
        }
        (Field::UserName, _) => "ユーザー名は必須です".to_string(),
        (Field::Email, Rule::Required) => "メールアドレスは必須です".to_string(),
        (Field::Email, _) => "有効なメールアドレスを入力してください".to_string(),

        (Field::CategoryName, Rule::TooLong { max }) => {
            format!("カテゴリ名は{}文字以内で入力してください", max)
        }
        (Field::CategoryName, _) => "カテゴリ名は必須です".to_string(),
        (Field::CategoryDescription, Rule::TooLong { max }) => {
            format!("説明は{}文字以内で入力してください", max)
        }
        (Field::CategoryDescription, _) => "無効な説明です".to_string(),
        (Field::Color, _) => "無効なカラーコードです".to_string(),

        (Field::Amount, Rule::NotPositive) => "金額は0より大きい値を入力してください".to_string(),
        (Field::Amount, Rule::ExceedsLimit) => "金額は10,000,000円以下で入力してください".to_string(),
        (Field::Amount, _) => "金額は必須です".to_string(),
        (Field::Currency, _) => "通貨は必須です".to_string(),
        (Field::Title, Rule::TooLong { max }) => {
            format!("タイトルは{}文字以内で入力してください", max)
        }
        (Field::Title, _) => "タイトルは必須です".to_string(),
        (Field::ExpenseDescription, Rule::TooLong { max }) => {
            format!("説明は{}文字以内で入力してください", max)
        }
        (Field::ExpenseDescription, _) => "無効な説明です".to_string(),
        (Field::Date, Rule::InFuture) => "未来の日付は入力できません".to_string(),
        (Field::Date, _) => "日付は必須です".to_string(),
    }
}

/// Generic message shown when a repository call fails
pub fn failure_message(operation: Operation, locale: Locale) -> String {
    match locale {
        Locale::En => {
            let noun = match (operation.action, operation.entity) {
                (Action::Fetch, EntityKind::Category) => "categories".to_string(),
                (Action::Fetch, entity) => format!("{}s", entity.label(Locale::En)),
                (_, entity) => entity.label(Locale::En).to_string(),
            };
            format!("Failed to {} {}", operation.action.as_str(), noun)
        }
        Locale::Ja => format!(
            "{}の{}に失敗しました",
            operation.entity.label(Locale::Ja),
            operation.action.label_ja()
        ),
    }
}

pub fn not_found_message(entity: EntityKind, id: &str, locale: Locale) -> String {
    match locale {
        Locale::En => format!("{} not found: {}", capitalize(entity.label(Locale::En)), id),
        Locale::Ja => format!("{}が見つかりません: {}", entity.label(Locale::Ja), id),
    }
}

pub fn transition_message(from: ExpenseStatus, action: ExpenseAction, locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "Cannot {} an expense that is {}; only pending expenses can be {}",
            action.as_str(),
            from.as_str(),
            action.past_participle()
        ),
        Locale::Ja => format!(
            "承認待ちの経費のみ{}できます（現在のステータス: {}）",
            review_verb_ja(action),
            from.display_name(Locale::Ja)
        ),
    }
}

pub fn category_in_use_message(locale: Locale) -> String {
    match locale {
        Locale::En => "Category is used by existing expenses and cannot be deleted".to_string(),
        Locale::Ja => "このカテゴリは経費で使用されているため削除できません".to_string(),
    }
}

/// Outcome notices a front end shows after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Removed,
    /// A listing came back empty
    NoneFound,
    /// Question asked before a removal
    ConfirmRemove,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn notice_message(entity: EntityKind, notice: Notice, locale: Locale) -> String {
    match locale {
        Locale::En => {
            let label = entity.label(Locale::En);
            match (notice, entity) {
                (Notice::Created, EntityKind::Expense) => "Expense submitted".to_string(),
                (Notice::Created, _) => format!("{} created", capitalize(label)),
                (Notice::Updated, _) => format!("{} updated", capitalize(label)),
                (Notice::Removed, _) => format!("{} removed", capitalize(label)),
                (Notice::NoneFound, EntityKind::Category) => "No categories found.".to_string(),
                (Notice::NoneFound, _) => format!("No {}s found.", label),
                (Notice::ConfirmRemove, _) => format!("Remove this {}?", label),
            }
        }
        Locale::Ja => {
            let label = entity.label(Locale::Ja);
            match (notice, entity) {
                (Notice::Created, EntityKind::Expense) => "経費を申請しました".to_string(),
                (Notice::Created, _) => format!("{}を作成しました", label),
                (Notice::Updated, _) => format!("{}を更新しました", label),
                (Notice::Removed, _) => format!("{}を削除しました", label),
                (Notice::NoneFound, _) => format!("{}はまだありません", label),
                (Notice::ConfirmRemove, _) => format!("この{}を削除しますか?", label),
            }
        }
    }
}

pub fn cancelled_message(locale: Locale) -> String {
    match locale {
        Locale::En => "Cancelled.".to_string(),
        Locale::Ja => "キャンセルしました".to_string(),
    }
}

pub fn no_approved_message(locale: Locale) -> String {
    match locale {
        Locale::En => "No approved expenses yet.".to_string(),
        Locale::Ja => "承認済みの経費はまだありません".to_string(),
    }
}

fn review_verb_ja(action: ExpenseAction) -> &'static str {
    match action {
        ExpenseAction::Approve => "承認",
        ExpenseAction::Reject => "却下",
        ExpenseAction::Edit => "編集",
    }
}

/// "Approved 3 expense(s)"
pub fn reviewed_message(action: ExpenseAction, count: usize, locale: Locale) -> String {
    match locale {
        Locale::En => format!(
            "{} {} expense(s)",
            capitalize(action.past_participle()),
            count
        ),
        Locale::Ja => format!("{}件の経費を{}しました", count, review_verb_ja(action)),
    }
}

/// "Failed to approve 2 expense(s)"
pub fn review_failed_message(action: ExpenseAction, count: usize, locale: Locale) -> String {
    match locale {
        Locale::En => format!("Failed to {} {} expense(s)", action.as_str(), count),
        Locale::Ja => format!("{}件の経費の{}に失敗しました", count, review_verb_ja(action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_en() {
        let op = Operation::new(Action::Create, EntityKind::Expense);
        assert_eq!(failure_message(op, Locale::En), "Failed to create expense");

        let op = Operation::new(Action::Fetch, EntityKind::Category);
        assert_eq!(failure_message(op, Locale::En), "Failed to fetch categories");
    }

    #[test]
    fn test_failure_message_ja() {
        let op = Operation::new(Action::Approve, EntityKind::Expense);
        assert_eq!(failure_message(op, Locale::Ja), "経費の承認に失敗しました");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("ja".parse::<Locale>().unwrap(), Locale::Ja);
        assert_eq!(" EN ".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_operation_name() {
        let op = Operation::new(Action::Delete, EntityKind::User);
        assert_eq!(op.name(), "delete_user");
    }

    #[test]
    fn test_notice_messages() {
        assert_eq!(
            notice_message(EntityKind::Expense, Notice::Created, Locale::En),
            "Expense submitted"
        );
        assert_eq!(
            notice_message(EntityKind::Category, Notice::NoneFound, Locale::En),
            "No categories found."
        );
        assert_eq!(
            notice_message(EntityKind::User, Notice::Removed, Locale::En),
            "User removed"
        );
        assert_eq!(
            notice_message(EntityKind::Expense, Notice::NoneFound, Locale::Ja),
            "経費はまだありません"
        );
        assert_eq!(
            notice_message(EntityKind::User, Notice::Created, Locale::Ja),
            "ユーザーを作成しました"
        );
        assert_eq!(cancelled_message(Locale::Ja), "キャンセルしました");
        assert_eq!(no_approved_message(Locale::En), "No approved expenses yet.");
    }

    #[test]
    fn test_review_messages() {
        assert_eq!(
            reviewed_message(ExpenseAction::Approve, 3, Locale::En),
            "Approved 3 expense(s)"
        );
        assert_eq!(
            review_failed_message(ExpenseAction::Reject, 2, Locale::En),
            "Failed to reject 2 expense(s)"
        );
        assert_eq!(
            reviewed_message(ExpenseAction::Reject, 1, Locale::Ja),
            "1件の経費を却下しました"
        );
    }
}
