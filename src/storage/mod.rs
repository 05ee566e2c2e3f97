//! Storage layer for SpendGrid
//!
//! Plain text is the database: every month lives in `<year>/<MM>.md` and
//! rules live in `_config/rules.yml`. All writes are whole-file atomic
//! rewrites.

pub mod file_io;
pub mod init;
pub mod month_file;
pub mod rules;

pub use file_io::{read_text, write_text_atomic};
pub use init::initialize_ledger;
pub use month_file::{MonthDocument, RuleLine, Section};
pub use rules::RuleRepository;

use crate::config::paths::LedgerPaths;
use crate::config::settings::{Locale, Settings};
use crate::currency::CurrencyNormalizer;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Transaction, YearMonth};
use crate::parser::parse_month_file;

/// Name of the backlog file in messages
const BACKLOG_LABEL: &str = "_pool/backlog.md";

/// Handle on an open ledger
///
/// Built once at startup and passed to every operation; nothing below it
/// reads the working directory or process-wide settings.
pub struct Ledger {
    paths: LedgerPaths,
    settings: Settings,
    currencies: CurrencyNormalizer,
    pub rules: RuleRepository,
}

impl Ledger {
    /// Open an initialized ledger and load its settings, currency table and rules
    pub fn open(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_initialized()?;

        let settings = Settings::load_or_default(&paths)?;
        let currencies = match CurrencyNormalizer::load(paths.currency_map_file()) {
            Ok(currencies) => currencies,
            Err(e) => {
                log::warn!("{}; using built-in currency table", e);
                CurrencyNormalizer::with_defaults()
            }
        };

        let rules = RuleRepository::new(paths.rules_file());
        rules.load()?;

        Ok(Self {
            paths,
            settings,
            currencies,
            rules,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn currencies(&self) -> &CurrencyNormalizer {
        &self.currencies
    }

    pub fn locale(&self) -> Locale {
        self.settings.language
    }

    /// Check if a month file exists
    pub fn month_exists(&self, month: YearMonth) -> bool {
        self.paths.month_file(month).exists()
    }

    /// Read a month file; `NotFound` if it does not exist
    pub fn load_month(&self, month: YearMonth) -> LedgerResult<MonthDocument> {
        let path = self.paths.month_file(month);
        if !path.exists() {
            return Err(LedgerError::NotFound {
                entity_type: "Month file",
                identifier: self.paths.display_month_file(month),
            });
        }
        let content = read_text(&path)?;
        Ok(MonthDocument::parse(
            self.paths.display_month_file(month),
            &content,
        ))
    }

    /// Read a month file, or start from the empty skeleton if it is missing
    ///
    /// The skeleton is not written until the caller saves the document.
    pub fn load_or_create_month(&self, month: YearMonth) -> LedgerResult<MonthDocument> {
        if self.month_exists(month) {
            return self.load_month(month);
        }
        Ok(MonthDocument::parse(
            self.paths.display_month_file(month),
            &month_file::skeleton(month, self.locale()),
        ))
    }

    /// Parse every record of a month file into (parsed, unparsed)
    pub fn parse_month(&self, month: YearMonth) -> LedgerResult<(Vec<Transaction>, Vec<Transaction>)> {
        let document = self.load_month(month)?;
        Ok(parse_month_file(&document.to_text(), &self.currencies))
    }

    /// Write a month file atomically
    pub fn save_month(&self, month: YearMonth, document: &MonthDocument) -> LedgerResult<()> {
        write_text_atomic(self.paths.month_file(month), &document.to_text())
    }

    /// Read the pool backlog
    ///
    /// A missing file starts from the empty backlog. A file without the
    /// `## POOL` marker gets one ahead of its first record line, or at the
    /// end when it has none.
    pub fn load_pool(&self) -> LedgerResult<MonthDocument> {
        let path = self.paths.backlog_file();
        let content = if path.exists() {
            read_text(&path)?
        } else {
            month_file::pool_skeleton()
        };
        let mut document = MonthDocument::parse(BACKLOG_LABEL, &content);
        if document.marker_index(Section::Pool).is_none() {
            let first_record = document
                .lines()
                .iter()
                .position(|line| line.trim_start().starts_with('-'));
            match first_record {
                Some(index) => document.insert_at(index, Section::Pool.marker()),
                None => {
                    document.ensure_section(Section::Pool);
                }
            }
        }
        Ok(document)
    }

    /// Write the pool backlog atomically
    pub fn save_pool(&self, document: &MonthDocument) -> LedgerResult<()> {
        write_text_atomic(self.paths.backlog_file(), &document.to_text())
    }

    /// Months of a year that have a file, in calendar order
    pub fn existing_months(&self, year: i32) -> Vec<YearMonth> {
        YearMonth::months_of(year)
            .filter(|m| self.month_exists(*m))
            .collect()
    }
}
