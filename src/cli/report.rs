//! CLI commands for reports
//!
//! Status of the current month, monthly and yearly totals, and validation
//! of the year's month files.

use chrono::Datelike;
use clap::Subcommand;

use crate::display::report::format_validation_report;
use crate::error::{LedgerError, LedgerResult};
use crate::models::YearMonth;
use crate::reports::{MonthlyReport, StatusReport, YearlyReport};
use crate::services::ValidationService;
use crate::storage::Ledger;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Show completed versus planned amounts for a month
    Status {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<YearMonth>,
    },

    /// Income, expenses and net per currency, by tag and by project
    Report {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long, conflicts_with = "year")]
        month: Option<YearMonth>,

        /// Whole year instead of a month
        #[arg(short, long)]
        year: Option<i32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check every month file of a year for unparsed lines
    Validate {
        /// Year, defaults to the current year
        #[arg(short, long)]
        year: Option<i32>,
    },
}

/// Handle a report command
pub fn handle_report_command(ledger: &Ledger, cmd: ReportCommands) -> LedgerResult<()> {
    let locale = ledger.locale();

    match cmd {
        ReportCommands::Status { month } => {
            let month = month.unwrap_or_else(YearMonth::current);
            let status = StatusReport::generate(ledger, month)?;
            print!("{}", status.format_terminal(month.month_name(locale)));
        }

        ReportCommands::Report { month, year, json } => match year {
            Some(year) => {
                let report = YearlyReport::generate(ledger, year)?;
                if json {
                    println!("{}", to_json(&report)?);
                } else {
                    print!("{}", report.format_terminal());
                }
            }
            None => {
                let month = month.unwrap_or_else(YearMonth::current);
                let report = MonthlyReport::generate(ledger, month)?;
                if json {
                    println!("{}", to_json(&report)?);
                } else {
                    print!("{}", report.format_terminal(month.month_name(locale)));
                }
            }
        },

        ReportCommands::Validate { year } => {
            let year = year.unwrap_or_else(|| chrono::Local::now().year());
            let report = ValidationService::new(ledger).validate_year(year)?;
            print!("{}", format_validation_report(&report));
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> LedgerResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| LedgerError::Json(e.to_string()))
}
