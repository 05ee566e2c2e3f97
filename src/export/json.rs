//! JSON Export functionality
//!
//! Exports parsed records with schema versioning and a small metadata block.

use std::collections::BTreeSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

use super::{ExportScope, ExportedTransaction};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Exported records of a month or year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// `YYYY-MM` or `YYYY`
    pub scope: String,

    pub transactions: Vec<ExportedTransaction>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,
    pub currencies: BTreeSet<String>,
    /// Earliest record date (`YYYY-MM-DD`)
    pub earliest_transaction: Option<String>,
    /// Latest record date (`YYYY-MM-DD`)
    pub latest_transaction: Option<String>,
}

impl LedgerExport {
    pub fn new(scope: ExportScope, transactions: Vec<ExportedTransaction>) -> Self {
        let earliest_transaction = transactions
            .iter()
            .map(|t| (t.month, t.day))
            .min()
            .map(|(month, day)| format!("{}-{:02}", month, day));
        let latest_transaction = transactions
            .iter()
            .map(|t| (t.month, t.day))
            .max()
            .map(|(month, day)| format!("{}-{:02}", month, day));

        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            currencies: transactions.iter().map(|t| t.currency.clone()).collect(),
            earliest_transaction,
            latest_transaction,
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            scope: scope.to_string(),
            transactions,
            metadata,
        }
    }
}

/// Write an export as JSON
pub fn export_json<W: Write>(export: &LedgerExport, writer: W, pretty: bool) -> LedgerResult<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, export)
    } else {
        serde_json::to_writer(writer, export)
    }
    .map_err(|e| LedgerError::Export(e.to_string()))
}
