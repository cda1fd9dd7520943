//! Field validators
//!
//! Every validator returns the full list of violations it found (empty means
//! valid). Callers concatenate the lists so that one bad field never hides
//! another.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::category::CategoryInput;
use super::expense::ExpenseInput;
use super::messages::{violation_message, Locale};
use super::user::UserInput;

pub const USER_NAME_MAX: usize = 100;
pub const CATEGORY_NAME_MAX: usize = 50;
pub const CATEGORY_DESCRIPTION_MAX: usize = 200;
pub const EXPENSE_TITLE_MAX: usize = 100;
pub const EXPENSE_DESCRIPTION_MAX: usize = 500;

/// Upper bound for a single expense amount (10,000,000)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Amounts are kept to this many decimal places
pub const AMOUNT_SCALE: u32 = 2;

pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern compiles"));

/// The input field a violation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    UserId,
    CategoryId,
    UserName,
    Email,
    CategoryName,
    CategoryDescription,
    Color,
    Amount,
    Currency,
    Title,
    ExpenseDescription,
    Date,
}

/// The rule a field broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    Required,
    TooLong { max: usize },
    InvalidFormat,
    NotPositive,
    ExceedsLimit,
    InFuture,
}

/// A single validation rule failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub field: Field,
    #[serde(flatten)]
    pub rule: Rule,
}

impl Violation {
    pub const fn new(field: Field, rule: Rule) -> Self {
        Self { field, rule }
    }

    pub fn message(&self, locale: Locale) -> String {
        violation_message(self, locale)
    }
}

/// Ordered list of violations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, field: Field, rule: Rule) {
        self.0.push(Violation::new(field, rule));
    }

    /// Append another list, keeping order
    pub fn extend(&mut self, other: Violations) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    pub fn contains(&self, field: Field, rule: Rule) -> bool {
        self.0.iter().any(|v| v.field == field && v.rule == rule)
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    pub fn messages(&self, locale: Locale) -> Vec<String> {
        self.0.iter().map(|v| v.message(locale)).collect()
    }

    /// All messages joined with ", "
    pub fn joined(&self, locale: Locale) -> String {
        self.messages(locale).join(", ")
    }

    /// `Ok(value)` when there are no violations
    pub fn into_result<T>(self, value: T) -> Result<T, Violations> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for Violations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined(Locale::En))
    }
}

/// Required, trimmed non-empty
pub fn validate_required(field: Field, value: &str) -> Violations {
    let mut violations = Violations::new();
    if value.trim().is_empty() {
        violations.push(field, Rule::Required);
    }
    violations
}

/// Required, trimmed non-empty, at most `max` characters after trimming
pub fn validate_name(field: Field, value: &str, max: usize) -> Violations {
    let mut violations = Violations::new();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(field, Rule::Required);
    } else if trimmed.chars().count() > max {
        violations.push(field, Rule::TooLong { max });
    }
    violations
}

/// Optional free text of at most `max` characters
pub fn validate_optional_text(field: Field, value: Option<&str>, max: usize) -> Violations {
    let mut violations = Violations::new();
    if let Some(text) = value {
        if text.chars().count() > max {
            violations.push(field, Rule::TooLong { max });
        }
    }
    violations
}

pub fn validate_email(value: &str) -> Violations {
    let mut violations = Violations::new();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(Field::Email, Rule::Required);
    } else if !EMAIL_RE.is_match(trimmed) {
        violations.push(Field::Email, Rule::InvalidFormat);
    }
    violations
}

/// A blank or missing color is valid (the default applies)
pub fn validate_color(value: Option<&str>) -> Violations {
    let mut violations = Violations::new();
    if let Some(color) = value.map(str::trim).filter(|c| !c.is_empty()) {
        if !COLOR_RE.is_match(color) {
            violations.push(Field::Color, Rule::InvalidFormat);
        }
    }
    violations
}

/// The color to store: the given one, or the default when blank
pub fn resolve_color(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY_COLOR)
        .to_string()
}

/// Round to [`AMOUNT_SCALE`] places, halves away from zero
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount must be present, positive, and within [`MAX_AMOUNT`] once rounded
/// with [`round_amount`].
///
/// A zero amount is reported as missing rather than non-positive, so an
/// amount that rounds to zero is missing too.
pub fn validate_amount(amount: Option<Decimal>) -> Violations {
    let mut violations = Violations::new();
    match amount.map(round_amount) {
        None => violations.push(Field::Amount, Rule::Required),
        Some(a) if a.is_zero() => violations.push(Field::Amount, Rule::Required),
        Some(a) if a.is_sign_negative() => violations.push(Field::Amount, Rule::NotPositive),
        Some(a) if a > MAX_AMOUNT => violations.push(Field::Amount, Rule::ExceedsLimit),
        Some(_) => {}
    }
    violations
}

/// Date must be present and not strictly after `now`
pub fn validate_date(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Violations {
    let mut violations = Violations::new();
    match date {
        None => violations.push(Field::Date, Rule::Required),
        Some(d) if d > now => violations.push(Field::Date, Rule::InFuture),
        Some(_) => {}
    }
    violations
}

/// Normalize a currency code to trimmed uppercase
pub fn normalize_currency(currency: &str) -> String {
    currency.trim().to_uppercase()
}

/// Name, then email
pub fn validate_user(input: &UserInput) -> Violations {
    input.validate()
}

/// Name, description, then color
pub fn validate_category(input: &CategoryInput) -> Violations {
    input.validate()
}

/// Every expense field in declaration order; `user_id` is checked when given
pub fn validate_expense(
    input: &ExpenseInput,
    user_id: Option<&str>,
    now: DateTime<Utc>,
) -> Violations {
    input.validate(user_id, now)
}
