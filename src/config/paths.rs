//! Path management for a SpendGrid ledger
//!
//! A ledger is a plain directory: a `.spendgrid` marker, a `_config/` folder,
//! a `_pool/` folder and one directory per year holding `MM.md` month files.
//! The currency alias map is per-user rather than per-ledger and lives in the
//! application data directory.
//!
//! ## Path Resolution Order
//!
//! Ledger root:
//! 1. `--root` flag or `SPENDGRID_ROOT` environment variable
//! 2. Current working directory
//!
//! Application data:
//! 1. `SPENDGRID_DATA_DIR` environment variable (if set)
//! 2. Platform data directory (`~/.local/share/spendgrid` on Linux)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{LedgerError, LedgerResult};
use crate::models::YearMonth;

/// Name of the marker file identifying a ledger root
pub const MARKER_FILE: &str = ".spendgrid";

/// Manages all paths used by a ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    /// Root directory of the ledger
    root: PathBuf,
    /// Per-user application data directory
    data_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve paths for the given root, or the current directory
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory or the application data
    /// directory cannot be determined.
    pub fn new(root: Option<PathBuf>) -> LedgerResult<Self> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir()
                .map_err(|e| LedgerError::Config(format!("Cannot read current directory: {}", e)))?,
        };

        Ok(Self {
            root,
            data_dir: app_data_dir()?,
        })
    }

    /// Create paths with explicit directories (useful for testing)
    pub fn with_dirs(root: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Get the ledger root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the application data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the `.spendgrid` marker file
    pub fn marker_file(&self) -> PathBuf {
        self.root.join(MARKER_FILE)
    }

    /// Get the `_config/` directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("_config")
    }

    /// Get the `_pool/` directory
    pub fn pool_dir(&self) -> PathBuf {
        self.root.join("_pool")
    }

    /// Get the path to the backlog file inside the pool
    pub fn backlog_file(&self) -> PathBuf {
        self.pool_dir().join("backlog.md")
    }

    /// Get the path to settings.yml
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir().join("settings.yml")
    }

    /// Get the path to rules.yml
    pub fn rules_file(&self) -> PathBuf {
        self.config_dir().join("rules.yml")
    }

    /// Get the path to categories.yml
    pub fn categories_file(&self) -> PathBuf {
        self.config_dir().join("categories.yml")
    }

    /// Get the path to projects.yml
    pub fn projects_file(&self) -> PathBuf {
        self.config_dir().join("projects.yml")
    }

    /// Get the path to the currency alias map
    pub fn currency_map_file(&self) -> PathBuf {
        self.data_dir.join("currency_maps.json")
    }

    /// Get the directory holding a year's month files
    pub fn year_dir(&self, year: i32) -> PathBuf {
        self.root.join(format!("{:04}", year))
    }

    /// Get the month file for a month (`<root>/2026/04.md`)
    pub fn month_file(&self, month: YearMonth) -> PathBuf {
        self.year_dir(month.year()).join(month.file_name())
    }

    /// Path of a month file relative to the root, for messages
    pub fn display_month_file(&self, month: YearMonth) -> String {
        format!("{:04}/{}", month.year(), month.file_name())
    }

    /// Check if the root carries the ledger marker
    pub fn is_initialized(&self) -> bool {
        self.marker_file().exists()
    }

    /// Fail with `NotInitialized` unless the root carries the ledger marker
    pub fn ensure_initialized(&self) -> LedgerResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(LedgerError::NotInitialized(self.root.display().to_string()))
        }
    }
}

/// Resolve the per-user application data directory
pub fn app_data_dir() -> LedgerResult<PathBuf> {
    if let Ok(custom) = std::env::var("SPENDGRID_DATA_DIR") {
        return Ok(PathBuf::from(custom));
    }

    ProjectDirs::from("", "", "spendgrid")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| LedgerError::Config("Could not determine a home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_dirs() {
        let root = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(root.path(), data.path());

        assert_eq!(paths.root(), root.path());
        assert_eq!(paths.config_dir(), root.path().join("_config"));
        assert_eq!(
            paths.currency_map_file(),
            data.path().join("currency_maps.json")
        );
    }

    #[test]
    fn test_month_file_layout() {
        let root = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(root.path(), root.path());
        let month = YearMonth::new(2026, 4).unwrap();

        assert_eq!(
            paths.month_file(month),
            root.path().join("2026").join("04.md")
        );
        assert_eq!(paths.display_month_file(month), "2026/04.md");
        assert_eq!(
            paths.rules_file(),
            root.path().join("_config").join("rules.yml")
        );
    }

    #[test]
    fn test_initialized_marker() {
        let root = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(root.path(), root.path());

        assert!(!paths.is_initialized());
        let err = paths.ensure_initialized().unwrap_err();
        assert!(matches!(err, LedgerError::NotInitialized(_)));

        std::fs::write(paths.marker_file(), "1 0\n").unwrap();
        assert!(paths.ensure_initialized().is_ok());
    }

    #[test]
    fn test_explicit_root() {
        let root = TempDir::new().unwrap();
        let paths = LedgerPaths::new(Some(root.path().to_path_buf())).unwrap();
        assert_eq!(paths.root(), root.path());
    }
}
