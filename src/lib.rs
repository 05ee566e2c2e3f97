//! SpendGrid - plain-text, file-per-month personal finance ledger
//!
//! Every month of the ledger is a Markdown file (`<year>/<MM>.md`) holding
//! one record per line under `## ROWS`, plus the lines recurring rules
//! project into `## RULES`. The files stay hand-editable; this crate parses,
//! edits and reports on them.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: ledger paths and per-ledger settings
//! - `error`: Custom error types
//! - `models`: money, months, transactions and rules
//! - `currency`: currency alias normalization and detection
//! - `parser`: the record grammar, amount sub-grammar and quick entry
//! - `storage`: month-file editing, the rules file, atomic writes
//! - `services`: Business logic layer (sync, transactions, rules, validation)
//! - `reports`: monthly, yearly and status aggregations
//! - `export`: CSV and JSON export
//! - `display`: terminal formatting
//! - `cli`: clap command definitions and handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use spendgrid::config::LedgerPaths;
//! use spendgrid::services::SyncService;
//! use spendgrid::storage::Ledger;
//!
//! let ledger = Ledger::open(LedgerPaths::new(None)?)?;
//! let result = SyncService::new(&ledger).sync()?;
//! ```

pub mod cli;
pub mod config;
pub mod currency;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod parser;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
