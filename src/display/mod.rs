//! Display formatting for terminal output
//!
//! Formats records, rules and command outcomes as plain strings; callers
//! decide where they are printed.

pub mod report;
pub mod rule;
pub mod transaction;

pub use report::{format_init_report, format_sync_result, format_validation_report};
pub use rule::{format_rule_details, format_rule_list};
pub use transaction::{
    format_month_listing, format_pool_listing, format_transaction_details, format_transaction_row,
};
