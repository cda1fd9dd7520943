//! User domain model

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::validation::{
    validate_email, validate_name, validate_required, Field, Violations, USER_NAME_MAX,
};

/// A person who files expenses
///
/// Immutable once constructed; two users are equal when their ids are.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: String,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Rebuild a user from stored fields
    pub fn restore(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, Violations> {
        let user = Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            created_at,
            updated_at,
        };

        let mut violations = validate_required(Field::Id, &user.id);
        violations.extend(validate_name(Field::UserName, &user.name, USER_NAME_MAX));
        violations.extend(validate_email(&user.email));
        violations.into_result(user)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// "Name (email)"
    pub fn display_info(&self) -> String {
        format!("{} ({})", self.name, self.email)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Raw user fields as submitted by a caller
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub name: String,
    pub email: String,
}

impl UserInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Violations {
        let mut violations = validate_name(Field::UserName, &self.name, USER_NAME_MAX);
        violations.extend(validate_email(&self.email));
        violations
    }

    /// Validate and normalize into the payload handed to a repository
    pub fn into_draft(self) -> Result<UserDraft, Violations> {
        let violations = self.validate();
        violations.into_result(UserDraft {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        })
    }
}

/// Validated user fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let now = Utc::now();
        let user = User::restore("user-123", "Alice", "alice@example.com", now, now).unwrap();
        assert_eq!(user.id(), "user-123");
        assert_eq!(user.email(), "alice@example.com");
        assert_eq!(user.display_info(), "Alice (alice@example.com)");
    }

    #[test]
    fn test_user_restore_collects_all_violations() {
        let now = Utc::now();
        let violations = User::restore("", "", "not-an-email", now, now).unwrap_err();
        assert_eq!(violations.len(), 3);
        assert!(violations.has_field(Field::Id));
        assert!(violations.has_field(Field::UserName));
        assert!(violations.has_field(Field::Email));
    }

    #[test]
    fn test_equality_by_id() {
        let now = Utc::now();
        let a = User::restore("u1", "Alice", "alice@example.com", now, now).unwrap();
        let b = User::restore("u1", "Alicia", "alicia@example.com", now, now).unwrap();
        let c = User::restore("u2", "Alice", "alice@example.com", now, now).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_input_is_trimmed() {
        let draft = UserInput::new("  Bob ", " bob@example.com ").into_draft().unwrap();
        assert_eq!(draft.name, "Bob");
        assert_eq!(draft.email, "bob@example.com");
    }
}
