//! Reports module for SpendGrid
//!
//! Aggregations over parsed month files: per-month and per-year totals by
//! currency, tag and project, and the status of a single month.

pub mod monthly;
pub mod status;

pub use monthly::{Breakdown, CurrencyTotals, MonthlyReport, TotalsByCurrency, YearlyReport};
pub use status::StatusReport;
