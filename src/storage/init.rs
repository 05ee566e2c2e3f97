//! Ledger initialization
//!
//! Handles first-run setup of a ledger directory: marker, config files, the
//! pool backlog and the month files of the current year.

use std::fs;

use crate::config::paths::LedgerPaths;
use crate::config::settings::Settings;
use crate::currency::CurrencyNormalizer;
use crate::error::{LedgerError, LedgerResult};
use crate::models::YearMonth;

use super::file_io::write_text_atomic;
use super::month_file::{pool_skeleton, skeleton};
use super::rules::RULES_HEADER;

/// Version written to the `.spendgrid` marker
pub const SCHEMA_VERSION: u32 = 1;

const CATEGORIES_TEMPLATE: &str = "# SpendGrid Categories\n# Tags start with #\n#categories: []\n";
const PROJECTS_TEMPLATE: &str = "# SpendGrid Projects\n# Projects start with @\n#projects: []\n";

/// What an initialization created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub year: i32,
    pub month_files: usize,
    pub config_files: usize,
    pub currency_map_written: bool,
}

/// Initialize a ledger at the paths' root for the given year
///
/// Fails with `Duplicate` when the root already carries the marker. Files
/// that already exist are left untouched.
pub fn initialize_ledger(
    paths: &LedgerPaths,
    settings: &Settings,
    year: i32,
    timestamp: i64,
) -> LedgerResult<InitReport> {
    if paths.is_initialized() {
        return Err(LedgerError::Duplicate {
            entity_type: "Ledger",
            identifier: paths.root().display().to_string(),
        });
    }

    for dir in [paths.config_dir(), paths.pool_dir(), paths.year_dir(year)] {
        fs::create_dir_all(&dir).map_err(|e| {
            LedgerError::Io(format!("Failed to create {}: {}", dir.display(), e))
        })?;
    }

    let mut report = InitReport {
        year,
        ..InitReport::default()
    };

    if !paths.settings_file().exists() {
        settings.save(paths)?;
        report.config_files += 1;
    }

    let templates = [
        (paths.rules_file(), format!("{}rules: []\n", RULES_HEADER)),
        (paths.categories_file(), CATEGORIES_TEMPLATE.to_string()),
        (paths.projects_file(), PROJECTS_TEMPLATE.to_string()),
        (paths.backlog_file(), pool_skeleton()),
    ];
    for (path, contents) in templates {
        if !path.exists() {
            write_text_atomic(&path, &contents)?;
            report.config_files += 1;
        }
    }

    for month in YearMonth::months_of(year) {
        let path = paths.month_file(month);
        if !path.exists() {
            write_text_atomic(&path, &skeleton(month, settings.language))?;
            report.month_files += 1;
        }
    }

    if !paths.currency_map_file().exists() {
        CurrencyNormalizer::with_defaults().save(paths.currency_map_file())?;
        report.currency_map_written = true;
    }

    // Marker last, so a failed init can simply be re-run
    write_text_atomic(
        paths.marker_file(),
        &format!("{} {}\n", SCHEMA_VERSION, timestamp),
    )?;

    Ok(report)
}
