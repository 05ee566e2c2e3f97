//! Custom error types for SpendGrid
//!
//! This module defines the error hierarchy for the ledger using thiserror.
//! Malformed record lines are not errors: the grammar keeps them as unparsed
//! transactions so they can be shown and fixed later.

use thiserror::Error;

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid user input (day, month, amount, currency, line index)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required section marker is missing from a month file
    #[error("Structure error: section '{marker}' not found in {file}")]
    Structure { marker: String, file: String },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// The ledger root has no `.spendgrid` marker
    #[error("Not a spendgrid directory: {0}. Run 'spendgrid init' first")]
    NotInitialized(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl LedgerError {
    /// Create a "not found" error for rules
    pub fn rule_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Rule",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for records addressed by position
    pub fn record_not_found(index: usize) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: format!("#{}", index),
        }
    }

    /// Create a structural error for a missing section marker
    pub fn section_missing(marker: &str, file: impl Into<String>) -> Self {
        Self::Structure {
            marker: marker.to_string(),
            file: file.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a structural error
    pub fn is_structure(&self) -> bool {
        matches!(self, Self::Structure { .. })
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for LedgerError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::rule_not_found("rent_1700000000");
        assert_eq!(err.to_string(), "Rule not found: rent_1700000000");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_structure_error() {
        let err = LedgerError::section_missing("## ROWS", "2026/10.md");
        assert_eq!(
            err.to_string(),
            "Structure error: section '## ROWS' not found in 2026/10.md"
        );
        assert!(err.is_structure());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
