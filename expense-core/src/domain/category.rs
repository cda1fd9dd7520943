//! Category domain model

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::validation::{
    resolve_color, validate_color, validate_name, validate_optional_text, validate_required,
    Field, Violations, CATEGORY_DESCRIPTION_MAX, CATEGORY_NAME_MAX,
};

/// An expense category with a display color
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    id: String,
    name: String,
    description: String,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
    /// Rebuild a category from stored fields. A blank color falls back to the default.
    pub fn restore(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        color: Option<&str>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, Violations> {
        let category = Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            color: resolve_color(color),
            created_at,
            updated_at,
        };

        let mut violations = validate_required(Field::Id, &category.id);
        violations.extend(validate_name(Field::CategoryName, &category.name, CATEGORY_NAME_MAX));
        violations.extend(validate_optional_text(
            Field::CategoryDescription,
            Some(&category.description),
            CATEGORY_DESCRIPTION_MAX,
        ));
        violations.extend(validate_color(Some(&category.color)));
        violations.into_result(category)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// "Name - description", or just the name when there is no description
    pub fn display_info(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.description)
        }
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            color: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn validate(&self) -> Violations {
        let mut violations = validate_name(Field::CategoryName, &self.name, CATEGORY_NAME_MAX);
        violations.extend(validate_optional_text(
            Field::CategoryDescription,
            self.description.as_deref(),
            CATEGORY_DESCRIPTION_MAX,
        ));
        violations.extend(validate_color(self.color.as_deref()));
        violations
    }

    /// Validate, trim, and apply the default color
    pub fn into_draft(self) -> Result<CategoryDraft, Violations> {
        let violations = self.validate();
        violations.into_result(CategoryDraft {
            name: self.name.trim().to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            color: resolve_color(self.color.as_deref()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{Rule, DEFAULT_CATEGORY_COLOR};

    #[test]
    fn test_color_defaults_when_omitted() {
        let draft = CategoryInput::new("Food").into_draft().unwrap();
        assert_eq!(draft.name, "Food");
        assert_eq!(draft.description, "");
        assert_eq!(draft.color, DEFAULT_CATEGORY_COLOR);
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let violations = CategoryInput::new("Food")
            .with_color("blue")
            .into_draft()
            .unwrap_err();
        assert!(violations.contains(Field::Color, Rule::InvalidFormat));
    }

    #[test]
    fn test_name_and_description_limits() {
        let violations = CategoryInput::new("x".repeat(51))
            .with_description("y".repeat(201))
            .validate();
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(Field::CategoryName, Rule::TooLong { max: 50 }));
        assert!(violations.contains(Field::CategoryDescription, Rule::TooLong { max: 200 }));
    }

    #[test]
    fn test_display_info() {
        let now = Utc::now();
        let plain = Category::restore("c1", "Travel", "", None, now, now).unwrap();
        assert_eq!(plain.display_info(), "Travel");
        assert_eq!(plain.color(), DEFAULT_CATEGORY_COLOR);

        let described =
            Category::restore("c2", "Food", "Meals out", Some("#ff0000"), now, now).unwrap();
        assert_eq!(described.display_info(), "Food - Meals out");
    }
}
