//! Rule CLI commands
//!
//! Manages the recurring rules in `_config/rules.yml`. Changes reach the
//! month files on the next sync.

use clap::Subcommand;

use crate::display::rule::{format_rule_details, format_rule_list};
use crate::error::LedgerResult;
use crate::models::{RuleType, YearMonth};
use crate::services::{NewRule, RuleEdit, RuleService};
use crate::storage::Ledger;

/// Rule subcommands
#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// List all rules
    #[command(alias = "ls")]
    List,
    /// Show rule details
    Show {
        /// Rule ID
        id: String,
    },
    /// Add a monthly rule
    Add {
        /// Rule name, as it appears in month files
        name: String,
        /// Amount, optionally with a currency ("-1000", "-1000 TL")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Day of month (1-31); clamped to the month's last day
        #[arg(short, long, default_value = "1")]
        day: u32,
        /// Currency when the amount has none; defaults to the base currency
        #[arg(short, long)]
        currency: Option<String>,
        /// income or expense; defaults by the amount's sign
        #[arg(short = 'T', long = "type")]
        rule_type: Option<RuleType>,
        /// Tags (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,
        /// Project
        #[arg(short, long)]
        project: Option<String>,
        /// Category
        #[arg(long)]
        category: Option<String>,
        /// First month (YYYY-MM)
        #[arg(long)]
        start: Option<YearMonth>,
        /// Last month (YYYY-MM)
        #[arg(long)]
        end: Option<YearMonth>,
        /// Total amount for installment plans
        #[arg(long, allow_hyphen_values = true)]
        total: Option<String>,
        /// Create the rule inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Edit a rule
    Edit {
        /// Rule ID
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(short, long)]
        currency: Option<String>,
        #[arg(short = 'T', long = "type")]
        rule_type: Option<RuleType>,
        #[arg(short, long)]
        day: Option<u32>,
        /// Replace tags (repeatable)
        #[arg(short, long)]
        tag: Option<Vec<String>>,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        start: Option<YearMonth>,
        #[arg(long)]
        end: Option<YearMonth>,
    },
    /// Activate or deactivate a rule
    Toggle {
        /// Rule ID
        id: String,
    },
    /// Delete a rule
    #[command(alias = "rm")]
    Remove {
        /// Rule ID
        id: String,
    },
}

/// Handle a rule command
pub fn handle_rule_command(ledger: &Ledger, cmd: RuleCommands) -> LedgerResult<()> {
    let service = RuleService::new(ledger);

    match cmd {
        RuleCommands::List => {
            let rules = service.list()?;
            println!("{}", format_rule_list(&rules));
        }

        RuleCommands::Show { id } => {
            let rule = service.get(&id)?;
            print!("{}", format_rule_details(&rule));
        }

        RuleCommands::Add {
            name,
            amount,
            day,
            currency,
            rule_type,
            tag,
            project,
            category,
            start,
            end,
            total,
            inactive,
        } => {
            let rule = service.add(NewRule {
                name,
                amount,
                currency,
                rule_type,
                day,
                tags: tag,
                project,
                category,
                start_date: start,
                end_date: end,
                total_amount: total,
                inactive,
            })?;
            println!("Created rule: {} ({})", rule.name, rule.id);
            println!("Run 'spendgrid sync' or any command to project it into month files.");
        }

        RuleCommands::Edit {
            id,
            name,
            amount,
            currency,
            rule_type,
            day,
            tag,
            project,
            category,
            start,
            end,
        } => {
            let rule = service.edit(
                &id,
                RuleEdit {
                    name,
                    amount,
                    currency,
                    rule_type,
                    day,
                    tags: tag,
                    project,
                    category,
                    start_date: start,
                    end_date: end,
                },
            )?;
            println!("Updated rule: {} ({})", rule.name, rule.id);
        }

        RuleCommands::Toggle { id } => {
            let rule = service.toggle(&id)?;
            let state = if rule.active { "activated" } else { "deactivated" };
            println!("Rule {} {}", rule.id, state);
        }

        RuleCommands::Remove { id } => {
            let rule = service.remove(&id)?;
            println!("Deleted rule: {} ({})", rule.name, rule.id);
            println!("Lines already in month files are kept.");
        }
    }

    Ok(())
}
