//! Ledger validation
//!
//! Scans every month file of a year and reports lines the record grammar
//! could not parse, along with missing configuration files. Validation
//! never fails on content; only I/O problems are errors.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::LedgerResult;
use crate::models::YearMonth;
use crate::parser::parse_month_file;
use crate::storage::{read_text, Ledger};

/// An unparsed line, located in its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Month file, relative to the ledger root ("2026/04.md")
    pub file: String,
    /// 1-based line number
    pub line_number: usize,
    pub raw: String,
}

/// Result of validating a year
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub year: i32,
    pub files: usize,
    pub records: usize,
    pub parsed: usize,
    pub unparsed: Vec<ValidationIssue>,
    pub missing_config: Vec<PathBuf>,
}

impl ValidationReport {
    /// True when nothing needs attention
    pub fn is_clean(&self) -> bool {
        self.unparsed.is_empty() && self.missing_config.is_empty()
    }
}

/// Service for ledger validation
pub struct ValidationService<'a> {
    ledger: &'a Ledger,
}

impl<'a> ValidationService<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Validate every existing month file of a year
    pub fn validate_year(&self, year: i32) -> LedgerResult<ValidationReport> {
        let paths = self.ledger.paths();
        let mut report = ValidationReport {
            year,
            ..ValidationReport::default()
        };

        for month in self.ledger.existing_months(year) {
            self.scan_month(month, &mut report)?;
        }

        report.missing_config = [paths.settings_file(), paths.rules_file()]
            .into_iter()
            .filter(|path| !path.exists())
            .collect();

        Ok(report)
    }

    fn scan_month(&self, month: YearMonth, report: &mut ValidationReport) -> LedgerResult<()> {
        let paths = self.ledger.paths();
        let content = read_text(paths.month_file(month))?;
        let (parsed, unparsed) = parse_month_file(&content, self.ledger.currencies());

        report.files += 1;
        report.records += parsed.len() + unparsed.len();
        report.parsed += parsed.len();

        let file = paths.display_month_file(month);
        report
            .unparsed
            .extend(unparsed.into_iter().map(|txn| ValidationIssue {
                file: file.clone(),
                line_number: txn.line_number,
                raw: txn.raw,
            }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::config::LedgerPaths;
    use crate::storage::init::initialize_ledger;
    use tempfile::TempDir;

    fn test_ledger() -> (TempDir, Ledger) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(temp_dir.path(), temp_dir.path().join("data"));
        initialize_ledger(&paths, &Settings::default(), 2026, 0).unwrap();
        (temp_dir, Ledger::open(paths).unwrap())
    }

    #[test]
    fn test_clean_ledger() {
        let (_temp_dir, ledger) = test_ledger();
        let report = ValidationService::new(&ledger).validate_year(2026).unwrap();

        assert_eq!(report.files, 12);
        assert_eq!(report.records, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_reports_unparsed_lines() {
        let (temp_dir, ledger) = test_ledger();
        std::fs::write(
            temp_dir.path().join("2026").join("02.md"),
            "## ROWS\n- 05 | Market | -50 TL |\n- garbage line\n\n## RULES\n- [x] 01 | Rent | -1000 TRY |\n",
        )
        .unwrap();

        let report = ValidationService::new(&ledger).validate_year(2026).unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(report.parsed, 2);
        assert_eq!(
            report.unparsed,
            vec![ValidationIssue {
                file: "2026/02.md".into(),
                line_number: 3,
                raw: "- garbage line".into(),
            }]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_missing_config_and_year() {
        let (temp_dir, ledger) = test_ledger();
        std::fs::remove_file(temp_dir.path().join("_config").join("rules.yml")).unwrap();

        let report = ValidationService::new(&ledger).validate_year(2030).unwrap();
        assert_eq!(report.files, 0);
        assert_eq!(report.missing_config.len(), 1);
    }
}
