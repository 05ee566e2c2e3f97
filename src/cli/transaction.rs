//! Transaction CLI commands
//!
//! Implements the record commands: add, quick, list, edit and remove.
//! Records are addressed by their position in the month's `## ROWS` section.

use clap::Subcommand;

use crate::display::transaction::{format_month_listing, format_transaction_details};
use crate::error::LedgerResult;
use crate::models::YearMonth;
use crate::services::{TransactionEdit, TransactionService};
use crate::storage::Ledger;

/// Transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Add a record: "DAY | DESCRIPTION | AMOUNT CURRENCY | #tags @projects"
    Add {
        /// The record, e.g. "05 | Market | -120.50 TL | #food"
        #[arg(allow_hyphen_values = true)]
        input: String,
        /// Target month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<YearMonth>,
        /// Note stored in the record's metadata
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Add a record from free text for today, e.g. "-100TL market #food @home"
    #[command(alias = "q")]
    Quick {
        /// Free-form entry
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// List the records of a month
    #[command(alias = "ls")]
    List {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// Show one record
    Show {
        /// Record number, as shown by `list`
        number: usize,
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
    /// Edit a record in place
    Edit {
        /// Record number, as shown by `list`
        number: usize,
        #[arg(short, long)]
        month: Option<YearMonth>,
        /// New day of month (1-31)
        #[arg(short, long)]
        day: Option<u32>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New amount, optionally with a currency ("-99.90 USD")
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// Replace tags (comma or space separated)
        #[arg(short, long)]
        tags: Option<String>,
        /// Replace projects (comma or space separated)
        #[arg(short, long)]
        projects: Option<String>,
        /// Replace the note; an empty value removes it
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Remove a record
    #[command(alias = "rm")]
    Remove {
        /// Record number, as shown by `list`
        number: usize,
        #[arg(short, long)]
        month: Option<YearMonth>,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(ledger: &Ledger, cmd: TransactionCommands) -> LedgerResult<()> {
    let service = TransactionService::new(ledger);
    let locale = ledger.locale();

    match cmd {
        TransactionCommands::Add { input, month, note } => {
            let month = month.unwrap_or_else(YearMonth::current);
            let (number, txn) = service.add_input(month, &input, note.as_deref())?;
            println!(
                "Added #{} to {}: {} {} {}",
                number,
                ledger.paths().display_month_file(month),
                txn.description,
                txn.amount,
                txn.currency
            );
        }

        TransactionCommands::Quick { words } => {
            let (month, number, txn) = service.add_quick(&words.join(" "))?;
            println!(
                "Added #{} to {}: {:02} {} {} {}",
                number,
                ledger.paths().display_month_file(month),
                txn.day,
                txn.description,
                txn.amount,
                txn.currency
            );
        }

        TransactionCommands::List { month } => {
            let month = month.unwrap_or_else(YearMonth::current);
            let listing = service.list(month)?;
            print!("{}", format_month_listing(&listing, month.month_name(locale)));
        }

        TransactionCommands::Show { number, month } => {
            let month = month.unwrap_or_else(YearMonth::current);
            let txn = service.get(month, number)?;
            if txn.is_unparsed {
                println!("Record {} does not parse: {}", number, txn.raw);
            } else {
                print!("{}", format_transaction_details(&txn));
            }
        }

        TransactionCommands::Edit {
            number,
            month,
            day,
            description,
            amount,
            tags,
            projects,
            note,
        } => {
            let month = month.unwrap_or_else(YearMonth::current);
            let changes = TransactionEdit {
                day,
                description,
                amount,
                tags: tags.map(|t| split_list(&t)),
                projects: projects.map(|p| split_list(&p)),
                note,
            };
            let txn = service.edit(month, number, changes)?;
            println!("Updated #{}: {}", number, txn.description);
        }

        TransactionCommands::Remove { number, month } => {
            let month = month.unwrap_or_else(YearMonth::current);
            let removed = service.remove(month, number)?;
            println!("Removed #{}: {}", number, removed);
        }
    }

    Ok(())
}

/// Split "a, b c" into ["a", "b", "c"]
fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
