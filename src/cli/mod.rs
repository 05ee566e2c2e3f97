//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod complete;
pub mod export;
pub mod pool;
pub mod report;
pub mod rules;
pub mod transaction;

pub use complete::{handle_completion_command, CompletionCommands};
pub use export::{handle_export_command, ExportArgs, ExportFormat};
pub use pool::{handle_pool_command, PoolCommands};
pub use report::{handle_report_command, ReportCommands};
pub use rules::{handle_rule_command, RuleCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
