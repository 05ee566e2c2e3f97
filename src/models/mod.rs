//! Core data models for SpendGrid
//!
//! This module contains the structures the ledger files are parsed into:
//! amounts, months, transactions and recurring rules.

pub mod money;
pub mod period;
pub mod rule;
pub mod transaction;

pub use money::{Money, MoneyParseError};
pub use period::YearMonth;
pub use rule::{Rule, RuleId, RuleType, RuleValidationError, Schedule};
pub use transaction::{Checkbox, Transaction, TransactionValidationError, NOTE_KEY};
