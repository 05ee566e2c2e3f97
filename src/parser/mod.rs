//! Text grammar of the ledger
//!
//! - `record`: one record line to and from a [`Transaction`](crate::models::Transaction)
//! - `amount`: the amount/currency/rate field
//! - `quick`: free-form quick entry

pub mod amount;
pub mod quick;
pub mod record;

pub use amount::{format_amount, parse_amount_field, AmountError, AmountField};
pub use quick::parse_quick;
pub use record::{format_transaction, parse_line, parse_month_file, split_fields};
