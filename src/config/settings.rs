//! Ledger settings
//!
//! Stored as YAML in `_config/settings.yml` so they stay hand-editable next
//! to the month files.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::file_io::{read_text, write_text_atomic};

/// Language used for generated text (month file headers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English (default)
    #[default]
    En,
    /// Turkish
    Tr,
}

impl std::str::FromStr for Locale {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "tr" => Ok(Self::Tr),
            other => Err(LedgerError::Validation(format!(
                "Unsupported language '{}': use en or tr",
                other
            ))),
        }
    }
}

/// Per-ledger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Currency assumed when an entry names none
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// Date format preference, shown in reports
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Language for generated headers
    #[serde(default)]
    pub language: Locale,
}

fn default_base_currency() -> String {
    "TRY".to_string()
}

fn default_date_format() -> String {
    "DD.MM.YYYY".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            date_format: default_date_format(),
            language: Locale::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, falling back to defaults if the file is missing
    pub fn load_or_default(paths: &LedgerPaths) -> LedgerResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = read_text(&settings_path)?;
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_yaml::from_str(&contents)
            .map_err(|e| LedgerError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> LedgerResult<()> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;
        write_text_atomic(paths.settings_file(), &contents)
    }
}
