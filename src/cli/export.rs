//! CLI command for data export
//!
//! Writes the parsed records of a month or a year as CSV or JSON, to a file
//! or to stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::Datelike;
use clap::{Args, ValueEnum};

use crate::error::{LedgerError, LedgerResult};
use crate::export::{
    collect_transactions, export_json, export_transactions_csv, ExportScope, LedgerExport,
};
use crate::models::YearMonth;
use crate::storage::Ledger;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per record
    Csv,
    /// JSON with export metadata
    Json,
}

/// Export arguments
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    /// Month (YYYY-MM); defaults to the current year when neither is given
    #[arg(short, long, conflicts_with = "year")]
    pub month: Option<YearMonth>,

    /// Year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Handle the export command
pub fn handle_export_command(ledger: &Ledger, args: ExportArgs) -> LedgerResult<()> {
    let scope = match (args.month, args.year) {
        (Some(month), _) => ExportScope::Month(month),
        (None, Some(year)) => ExportScope::Year(year),
        (None, None) => ExportScope::Year(chrono::Local::now().year()),
    };

    let transactions = collect_transactions(ledger, scope)?;
    let count = transactions.len();

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                LedgerError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            write_export(&mut writer, args.format, scope, transactions, args.pretty)?;
            writer
                .flush()
                .map_err(|e| LedgerError::Export(e.to_string()))?;
            println!("Exported {} record(s) to: {}", count, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_export(&mut writer, args.format, scope, transactions, args.pretty)?;
            if matches!(args.format, ExportFormat::Json) {
                writeln!(writer).map_err(|e| LedgerError::Export(e.to_string()))?;
            }
        }
    }

    Ok(())
}

fn write_export<W: Write>(
    writer: &mut W,
    format: ExportFormat,
    scope: ExportScope,
    transactions: Vec<crate::export::ExportedTransaction>,
    pretty: bool,
) -> LedgerResult<()> {
    match format {
        ExportFormat::Csv => export_transactions_csv(&transactions, writer),
        ExportFormat::Json => export_json(&LedgerExport::new(scope, transactions), writer, pretty),
    }
}
