use std::path::PathBuf;

use anyhow::Result;
use chrono::Datelike;
use clap::{Parser, Subcommand};

use spendgrid::cli::{
    handle_completion_command, handle_export_command, handle_pool_command, handle_report_command,
    handle_rule_command, handle_transaction_command, CompletionCommands, ExportArgs, PoolCommands,
    ReportCommands, RuleCommands, TransactionCommands,
};
use spendgrid::config::{LedgerPaths, Locale, Settings};
use spendgrid::currency::CurrencyNormalizer;
use spendgrid::display::{format_init_report, format_sync_result};
use spendgrid::models::YearMonth;
use spendgrid::services::SyncService;
use spendgrid::storage::{initialize_ledger, Ledger};

#[derive(Parser)]
#[command(
    name = "spendgrid",
    version,
    about = "Plain-text, file-per-month personal finance ledger",
    long_about = "SpendGrid keeps every month of your finances in a Markdown file \
                  (<year>/<MM>.md) that you can edit by hand. Recurring rules are \
                  projected into each month as checkbox lines you tick off once paid."
)]
struct Cli {
    /// Ledger directory (defaults to the current directory)
    #[arg(long, global = true, env = "SPENDGRID_ROOT")]
    root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a ledger in the root directory
    Init {
        /// Base currency for entries without one
        #[arg(long)]
        base_currency: Option<String>,
        /// Month-name language (en, tr)
        #[arg(long)]
        language: Option<Locale>,
        /// Year to create month files for, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Project active rules into month files through December
    Sync {
        /// First month to sync (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        from: Option<YearMonth>,
    },

    #[command(flatten)]
    Transaction(TransactionCommands),

    #[command(flatten)]
    Completion(CompletionCommands),

    #[command(flatten)]
    Report(ReportCommands),

    /// Recurring rule management
    #[command(subcommand, alias = "rule")]
    Rules(RuleCommands),

    /// Backlog of items not yet placed in a month
    #[command(subcommand)]
    Pool(PoolCommands),

    /// Export parsed records as CSV or JSON
    Export(ExportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = LedgerPaths::new(cli.root)?;

    let Some(command) = cli.command else {
        println!("SpendGrid - plain-text personal finance ledger");
        println!();
        println!("Run 'spendgrid init' to create a ledger here.");
        println!("Run 'spendgrid --help' for usage information.");
        return Ok(());
    };

    let command = match command {
        Commands::Init {
            base_currency,
            language,
            year,
        } => return run_init(&paths, base_currency, language, year),
        command => command,
    };

    let ledger = Ledger::open(paths)?;

    if !matches!(command, Commands::Sync { .. }) {
        auto_sync(&ledger);
    }

    log::debug!("Ledger at {}", ledger.paths().root().display());

    match command {
        Commands::Init { .. } => {}
        Commands::Sync { from } => {
            let start = from.unwrap_or_else(YearMonth::current);
            let result = SyncService::new(&ledger).sync_from(start)?;
            print!("{}", format_sync_result(&result));
        }
        Commands::Transaction(cmd) => handle_transaction_command(&ledger, cmd)?,
        Commands::Completion(cmd) => handle_completion_command(&ledger, cmd)?,
        Commands::Report(cmd) => handle_report_command(&ledger, cmd)?,
        Commands::Rules(cmd) => handle_rule_command(&ledger, cmd)?,
        Commands::Pool(cmd) => handle_pool_command(&ledger, cmd)?,
        Commands::Export(args) => handle_export_command(&ledger, args)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run_init(
    paths: &LedgerPaths,
    base_currency: Option<String>,
    language: Option<Locale>,
    year: Option<i32>,
) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(token) = base_currency {
        let currencies = CurrencyNormalizer::load(paths.currency_map_file())
            .unwrap_or_else(|_| CurrencyNormalizer::with_defaults());
        settings.base_currency = currencies.resolve(&token)?;
    }
    if let Some(language) = language {
        settings.language = language;
    }

    let now = chrono::Local::now();
    let year = year.unwrap_or_else(|| now.year());
    let report = initialize_ledger(paths, &settings, year, now.timestamp())?;

    print!("{}", format_init_report(&report, paths.root()));
    println!();
    println!("Add a rule with 'spendgrid rules add <name> <amount>'.");
    Ok(())
}

/// Sync from the current month before running a command; problems are
/// warnings only
fn auto_sync(ledger: &Ledger) {
    match SyncService::new(ledger).sync() {
        Ok(result) => {
            for error in &result.errors {
                log::warn!("auto-sync: {}", error);
            }
            if result.changed_anything() {
                log::debug!(
                    "auto-sync: {} added, {} updated",
                    result.added,
                    result.updated
                );
            }
        }
        Err(e) => log::warn!("auto-sync failed: {}", e),
    }
}
