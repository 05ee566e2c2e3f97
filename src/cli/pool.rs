//! Pool backlog CLI commands
//!
//! Items without a month wait in `_pool/backlog.md` until they are moved
//! into a month's ROWS.

use clap::Subcommand;

use crate::display::format_pool_listing;
use crate::error::LedgerResult;
use crate::models::YearMonth;
use crate::services::PoolService;
use crate::storage::Ledger;

/// Pool subcommands
#[derive(Subcommand, Debug)]
pub enum PoolCommands {
    /// List backlog items
    #[command(alias = "ls")]
    List,
    /// Add an item: "DAY | DESCRIPTION | AMOUNT CURRENCY | #tags @projects"
    Add {
        /// The item, e.g. "15 | Laptop | -40000 TL | #tech"
        #[arg(allow_hyphen_values = true)]
        input: String,
        /// Note stored in the item's metadata
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Move an item into a month's records
    #[command(alias = "mv")]
    Move {
        /// Item number, as shown by `pool list`
        number: usize,
        /// Target month (YYYY-MM)
        month: YearMonth,
    },
    /// Remove an item
    #[command(alias = "rm")]
    Remove {
        /// Item number, as shown by `pool list`
        number: usize,
    },
}

/// Handle a pool command
pub fn handle_pool_command(ledger: &Ledger, cmd: PoolCommands) -> LedgerResult<()> {
    let service = PoolService::new(ledger);

    match cmd {
        PoolCommands::List => {
            let items = service.list()?;
            print!("{}", format_pool_listing(&items));
        }

        PoolCommands::Add { input, note } => {
            let (number, txn) = service.add_input(&input, note.as_deref())?;
            println!(
                "Added pool item #{}: {} {} {}",
                number, txn.description, txn.amount, txn.currency
            );
        }

        PoolCommands::Move { number, month } => {
            let (position, txn) = service.move_to_month(number, month)?;
            println!(
                "Moved pool item #{} to {} as #{}: {:02} {}",
                number,
                ledger.paths().display_month_file(month),
                position,
                txn.day,
                txn.description
            );
        }

        PoolCommands::Remove { number } => {
            let removed = service.remove(number)?;
            println!("Removed pool item #{}: {}", number, removed);
        }
    }

    Ok(())
}
