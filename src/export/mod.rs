//! Export module for SpendGrid
//!
//! Exports the parsed records of a month or a whole year:
//! - CSV: one row per record (spreadsheet-compatible)
//! - JSON: records plus export metadata, schema-versioned

pub mod csv;
pub mod json;

pub use self::csv::export_transactions_csv;
pub use self::json::{export_json, LedgerExport, EXPORT_SCHEMA_VERSION};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerResult;
use crate::models::{Checkbox, Money, Transaction, YearMonth};
use crate::storage::Ledger;

/// Which months an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Month(YearMonth),
    Year(i32),
}

impl ExportScope {
    /// Months of the scope that have a file
    pub fn months(&self, ledger: &Ledger) -> Vec<YearMonth> {
        match self {
            Self::Month(month) if ledger.month_exists(*month) => vec![*month],
            Self::Month(_) => Vec::new(),
            Self::Year(year) => ledger.existing_months(*year),
        }
    }
}

impl fmt::Display for ExportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month(month) => write!(f, "{}", month),
            Self::Year(year) => write!(f, "{}", year),
        }
    }
}

/// A parsed record together with the month it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedTransaction {
    pub month: YearMonth,
    pub day: u32,
    pub description: String,
    pub amount: Money,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    /// Checkbox of rule-derived lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<Checkbox>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ExportedTransaction {
    pub fn new(month: YearMonth, txn: Transaction) -> Self {
        Self {
            month,
            day: txn.day,
            description: txn.description,
            amount: txn.amount,
            currency: txn.currency,
            rate: txn.rate,
            tags: txn.tags,
            projects: txn.projects,
            checkbox: txn.checkbox,
            meta: txn.meta,
        }
    }

    /// `YYYY-MM-DD`
    pub fn date(&self) -> String {
        format!("{}-{:02}", self.month, self.day)
    }
}

/// Collect the parsed records of every month in scope, in file order
pub fn collect_transactions(
    ledger: &Ledger,
    scope: ExportScope,
) -> LedgerResult<Vec<ExportedTransaction>> {
    let mut out = Vec::new();
    for month in scope.months(ledger) {
        let (parsed, _) = ledger.parse_month(month)?;
        out.extend(
            parsed
                .into_iter()
                .map(|txn| ExportedTransaction::new(month, txn)),
        );
    }
    Ok(out)
}
