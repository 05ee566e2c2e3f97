//! CSV Export functionality
//!
//! One row per record. Tags and projects are space-separated, metadata is
//! `key:value` pairs joined by `;`.

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};

use super::ExportedTransaction;

const HEADER: [&str; 11] = [
    "Date",
    "Month",
    "Day",
    "Description",
    "Amount",
    "Currency",
    "Rate",
    "Tags",
    "Projects",
    "Status",
    "Meta",
];

/// Export records to CSV
pub fn export_transactions_csv<W: Write>(
    transactions: &[ExportedTransaction],
    writer: W,
) -> LedgerResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(HEADER).map_err(export_error)?;

    for txn in transactions {
        let status = match txn.checkbox {
            Some(checkbox) if checkbox.is_checked() => "completed",
            Some(_) => "planned",
            None => "",
        };
        let meta: Vec<String> = txn
            .meta
            .iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect();

        csv_writer
            .write_record([
                txn.date(),
                txn.month.to_string(),
                txn.day.to_string(),
                txn.description.clone(),
                format!("{:.2}", txn.amount.to_f64()),
                txn.currency.clone(),
                txn.rate.map(|r| format!("{:.2}", r)).unwrap_or_default(),
                txn.tags.join(" "),
                txn.projects.join(" "),
                status.to_string(),
                meta.join(";"),
            ])
            .map_err(export_error)?;
    }

    csv_writer
        .flush()
        .map_err(|e| LedgerError::Export(e.to_string()))?;
    Ok(())
}

fn export_error(e: csv::Error) -> LedgerError {
    LedgerError::Export(e.to_string())
}
