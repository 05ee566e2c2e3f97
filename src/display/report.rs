//! Formatting for sync runs, validation and initialization

use crate::services::{SyncResult, ValidationReport};
use crate::storage::init::InitReport;

/// Format a sync run
pub fn format_sync_result(result: &SyncResult) -> String {
    let mut output = format!(
        "Sync complete: {} added, {} updated, {} skipped (completed)\n",
        result.added, result.updated, result.skipped
    );

    if result.has_errors() {
        output.push_str(&format!("{} month(s) failed:\n", result.errors.len()));
        for error in &result.errors {
            output.push_str(&format!("  {}\n", error));
        }
    }

    output
}

/// Format a validation report
pub fn format_validation_report(report: &ValidationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Validation: {}\n", report.year));
    output.push_str(&"=".repeat(40));
    output.push('\n');
    output.push_str(&format!("Files checked:  {}\n", report.files));
    output.push_str(&format!("Records:        {}\n", report.records));
    output.push_str(&format!("Parsed:         {}\n", report.parsed));
    output.push_str(&format!("Unparsed:       {}\n", report.unparsed.len()));

    if !report.unparsed.is_empty() {
        output.push_str("\nUnparsed lines:\n");
        for issue in &report.unparsed {
            output.push_str(&format!(
                "  {}:{} | {}\n",
                issue.file, issue.line_number, issue.raw
            ));
        }
    }

    if !report.missing_config.is_empty() {
        output.push_str("\nMissing config files:\n");
        for path in &report.missing_config {
            output.push_str(&format!("  {}\n", path.display()));
        }
    }

    if report.is_clean() {
        output.push_str("\nAll records are valid.\n");
    }

    output
}

/// Format the outcome of `init`
pub fn format_init_report(report: &InitReport, root: &std::path::Path) -> String {
    let mut output = format!("Initialized SpendGrid ledger in {}\n", root.display());
    output.push_str(&format!(
        "  {} month file(s) for {}\n",
        report.month_files, report.year
    ));
    output.push_str(&format!("  {} config file(s)\n", report.config_files));
    if report.currency_map_written {
        output.push_str("  default currency map written\n");
    }
    output
}
