//! Service layer for SpendGrid
//!
//! The service layer provides business logic on top of the storage layer:
//! input validation, rule projection, edits addressed by record position
//! and the pool backlog.

pub mod pool;
pub mod rule;
pub mod sync;
pub mod transaction;
pub mod validate;

pub use pool::PoolService;
pub use rule::{CompletionChange, NewRule, RuleEdit, RuleService};
pub use sync::{reconcile_month, sync_rules, MonthSync, SyncResult, SyncService};
pub use transaction::{ListedRecord, MonthListing, TransactionEdit, TransactionService};
pub use validate::{ValidationIssue, ValidationReport, ValidationService};
