//! Configuration module for SpendGrid
//!
//! This module provides configuration management including:
//! - Ledger root and application data path resolution
//! - Per-ledger settings persistence

pub mod paths;
pub mod settings;

pub use paths::{app_data_dir, LedgerPaths, MARKER_FILE};
pub use settings::{Locale, Settings};
