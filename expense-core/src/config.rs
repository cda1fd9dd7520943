//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "app": { "locale": "ja", "defaultCurrency": "JPY" }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::validation::normalize_currency;
use crate::domain::Locale;

/// Environment variable overriding the message locale
pub const LOCALE_ENV: &str = "EXPENSE_LOCALE";

/// Environment variable overriding the default currency
pub const DEFAULT_CURRENCY_ENV: &str = "EXPENSE_DEFAULT_CURRENCY";

/// Currency used when an expense does not name one
pub const DEFAULT_CURRENCY: &str = "JPY";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_currency: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub locale: Locale,
    pub default_currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Config {
    /// Load config from the data directory, applying environment overrides
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |key| std::env::var(key).ok())
    }

    /// Load config, reading overrides through `env`
    pub fn load_with_env(data_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = read_settings(data_dir)?;

        let locale = env(LOCALE_ENV)
            .or(raw.app.locale)
            .and_then(|value| match value.parse::<Locale>() {
                Ok(locale) => Some(locale),
                Err(e) => {
                    eprintln!("[expense] Ignoring locale setting: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        let default_currency = env(DEFAULT_CURRENCY_ENV)
            .or(raw.app.default_currency)
            .map(|c| normalize_currency(&c))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(Self {
            locale,
            default_currency,
        })
    }

    /// Save config to the data directory, preserving settings we don't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let mut settings = read_settings(data_dir)?;
        settings.app.locale = Some(self.locale.as_str().to_string());
        settings.app.default_currency = Some(self.default_currency.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

/// A missing or unreadable settings file counts as empty
fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}
