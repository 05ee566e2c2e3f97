//! Month status
//!
//! Splits a month into what already happened (plain rows and checked rule
//! lines) and what is still planned (unchecked rule lines).

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::LedgerResult;
use crate::models::{Transaction, YearMonth};
use crate::storage::Ledger;

use super::monthly::TotalsByCurrency;

/// Status of one month
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub month: YearMonth,
    /// False when the month has no file yet
    pub file_exists: bool,
    pub completed: TotalsByCurrency,
    pub planned: TotalsByCurrency,
    pub completed_count: usize,
    pub planned_count: usize,
    pub tags: BTreeSet<String>,
    pub projects: BTreeSet<String>,
    pub active_rules: usize,
    pub unparsed_count: usize,
}

impl StatusReport {
    /// Generate the status of a month
    pub fn generate(ledger: &Ledger, month: YearMonth) -> LedgerResult<Self> {
        let active_rules = ledger.rules.active()?.len();

        if !ledger.month_exists(month) {
            return Ok(Self::from_transactions(month, &[], 0, active_rules, false));
        }

        let (parsed, unparsed) = ledger.parse_month(month)?;
        Ok(Self::from_transactions(
            month,
            &parsed,
            unparsed.len(),
            active_rules,
            true,
        ))
    }

    pub fn from_transactions(
        month: YearMonth,
        transactions: &[Transaction],
        unparsed_count: usize,
        active_rules: usize,
        file_exists: bool,
    ) -> Self {
        let mut report = Self {
            month,
            file_exists,
            completed: TotalsByCurrency::new(),
            planned: TotalsByCurrency::new(),
            completed_count: 0,
            planned_count: 0,
            tags: BTreeSet::new(),
            projects: BTreeSet::new(),
            active_rules,
            unparsed_count,
        };

        for txn in transactions {
            let bucket = if txn.is_completed() {
                report.completed_count += 1;
                &mut report.completed
            } else {
                report.planned_count += 1;
                &mut report.planned
            };
            bucket
                .entry(txn.currency.clone())
                .or_default()
                .record(txn.amount);

            report.tags.extend(txn.tags.iter().cloned());
            report.projects.extend(txn.projects.iter().cloned());
        }

        report
    }

    /// Format the status for terminal display
    pub fn format_terminal(&self, month_name: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Status: {} {}\n",
            month_name,
            self.month.year()
        ));
        output.push_str(&"=".repeat(40));
        output.push('\n');

        if !self.file_exists {
            output.push_str("No month file yet.\n");
        }

        output.push_str(&format!("\nCompleted: {}\n", self.completed_count));
        for (currency, totals) in &self.completed {
            output.push_str(&format!(
                "  {:<5} income {}  expense {}  net {}\n",
                currency,
                totals.income,
                totals.expenses,
                totals.net()
            ));
        }

        if self.planned_count > 0 {
            output.push_str(&format!("\nPlanned: {}\n", self.planned_count));
            for (currency, totals) in &self.planned {
                output.push_str(&format!(
                    "  {:<5} expected income {}  expected expense {}  net {}\n",
                    currency,
                    totals.income,
                    totals.expenses,
                    totals.net()
                ));
            }
        }

        output.push_str(&format!(
            "\nTags: {}  Projects: {}\n",
            self.tags.len(),
            self.projects.len()
        ));
        output.push_str(&format!("Active rules: {}\n", self.active_rules));

        if self.unparsed_count > 0 {
            output.push_str(&format!(
                "\nWarning: {} unparsed line(s) in this month. Run 'spendgrid validate' for details.\n",
                self.unparsed_count
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::config::LedgerPaths;
    use crate::models::Money;
    use crate::storage::init::initialize_ledger;
    use tempfile::TempDir;

    #[test]
    fn test_completed_and_planned() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(temp_dir.path(), temp_dir.path().join("data"));
        initialize_ledger(&paths, &Settings::default(), 2026, 0).unwrap();
        std::fs::write(
            temp_dir.path().join("2026").join("04.md"),
            "# 2026 April\n\n## ROWS\n- 03 | Market | -200 TL | #food @home\n- oops\n\n## RULES\n\
             - [x] 01 | Rent | -1000.00 TRY | #home\n- [ ] 15 | Salary | 5000.00 TRY |\n",
        )
        .unwrap();
        let ledger = Ledger::open(paths).unwrap();

        let status = StatusReport::generate(&ledger, YearMonth::new(2026, 4).unwrap()).unwrap();
        assert_eq!(status.completed_count, 2);
        assert_eq!(status.planned_count, 1);
        assert_eq!(status.completed["TRY"].expenses, Money::from_units(1200));
        assert_eq!(status.planned["TRY"].income, Money::from_units(5000));
        assert_eq!(status.tags.len(), 2);
        assert_eq!(status.projects.len(), 1);
        assert_eq!(status.unparsed_count, 1);
        assert_eq!(status.active_rules, 0);

        let text = status.format_terminal("April");
        assert!(text.contains("Planned: 1"));
        assert!(text.contains("1 unparsed line(s)"));
    }

    #[test]
    fn test_missing_month() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(temp_dir.path(), temp_dir.path().join("data"));
        initialize_ledger(&paths, &Settings::default(), 2026, 0).unwrap();
        let ledger = Ledger::open(paths).unwrap();

        let status = StatusReport::generate(&ledger, YearMonth::new(2031, 1).unwrap()).unwrap();
        assert!(!status.file_exists);
        assert_eq!(status.completed_count, 0);
    }
}
