//! Completion CLI commands
//!
//! Checks off (or reopens) the `[ ]` lines that rules project into month
//! files.

use chrono::Datelike;
use clap::Subcommand;

use crate::error::LedgerResult;
use crate::models::{Checkbox, YearMonth};
use crate::services::RuleService;
use crate::storage::Ledger;

/// Completion subcommands
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Mark the next unchecked line of a rule as done
    Complete {
        /// Rule ID
        rule_id: String,
        /// Only search this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// Reopen the first checked line of a rule
    Uncomplete {
        /// Rule ID
        rule_id: String,
        /// Only search this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// Mark every rule line of a month as done
    CompleteMonth {
        /// Month (YYYY-MM), defaults to the current month
        month: Option<YearMonth>,
    },
}

/// Handle a completion command
pub fn handle_completion_command(ledger: &Ledger, cmd: CompletionCommands) -> LedgerResult<()> {
    let service = RuleService::new(ledger);
    let year = chrono::Local::now().year();

    match cmd {
        CompletionCommands::Complete { rule_id, month } => {
            let change = service.set_completion(&rule_id, Checkbox::Checked, year, month)?;
            println!(
                "Completed in {} (line {}): {}",
                ledger.paths().display_month_file(change.month),
                change.line_number,
                change.line
            );
        }

        CompletionCommands::Uncomplete { rule_id, month } => {
            let change = service.set_completion(&rule_id, Checkbox::Unchecked, year, month)?;
            println!(
                "Reopened in {} (line {}): {}",
                ledger.paths().display_month_file(change.month),
                change.line_number,
                change.line
            );
        }

        CompletionCommands::CompleteMonth { month } => {
            let month = month.unwrap_or_else(YearMonth::current);
            let count = service.complete_month(month)?;
            println!(
                "Completed {} rule line(s) in {}",
                count,
                ledger.paths().display_month_file(month)
            );
        }
    }

    Ok(())
}
