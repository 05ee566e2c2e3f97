//! Transaction service
//!
//! Adds, lists, edits and removes records in the `## ROWS` section of a
//! month file. Records are addressed by their 1-based position in ROWS.

use chrono::Datelike;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Transaction, YearMonth};
use crate::parser::{
    format_transaction, parse_amount_field, parse_line, parse_quick, split_fields, AmountError,
};
use crate::parser::record::{parse_meta, parse_tokens};
use crate::storage::{Ledger, Section};

/// A record of a month listing
#[derive(Debug, Clone)]
pub struct ListedRecord {
    /// Position in ROWS, as used by edit and remove
    pub number: usize,
    pub transaction: Transaction,
}

/// Everything a month file holds, split by section
#[derive(Debug, Clone)]
pub struct MonthListing {
    pub month: YearMonth,
    /// ROWS records in file order, unparsed ones included
    pub rows: Vec<ListedRecord>,
    /// Parsed rule lines of the RULES section
    pub rule_lines: Vec<Transaction>,
    /// Unparsed records anywhere in the file
    pub unparsed: Vec<Transaction>,
}

/// Field changes for an edit; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct TransactionEdit {
    pub day: Option<u32>,
    pub description: Option<String>,
    /// Amount field text; without a currency the current one is kept
    pub amount: Option<String>,
    pub tags: Option<Vec<String>>,
    pub projects: Option<Vec<String>>,
    pub note: Option<String>,
}

impl TransactionEdit {
    pub fn is_empty(&self) -> bool {
        self.day.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.tags.is_none()
            && self.projects.is_none()
            && self.note.is_none()
    }
}

/// Service for transaction management
pub struct TransactionService<'a> {
    ledger: &'a Ledger,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Parse direct input: `DAY | DESCRIPTION | AMOUNT CURRENCY | TAGS [| [META]]`
    ///
    /// The tags field may be left out. Unlike reading a file, anything that
    /// does not fit is an error here.
    pub fn parse_input(&self, input: &str) -> LedgerResult<Transaction> {
        let fields = split_fields(input.trim().trim_start_matches('-').trim_start());
        if fields.len() < 3 {
            return Err(LedgerError::Validation(format!(
                "Expected 'DAY | DESCRIPTION | AMOUNT CURRENCY | TAGS', got '{}'",
                input.trim()
            )));
        }

        let day = parse_day(&fields[0])?;
        let amount = parse_amount_field(&fields[2], self.ledger.currencies())
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let mut txn = Transaction::new(day, fields[1].as_str(), amount.amount, amount.currency);
        txn.rate = amount.rate;
        if let Some(tokens) = fields.get(3) {
            parse_tokens(tokens, &mut txn);
        }
        if let Some(meta) = fields.get(4) {
            parse_meta(meta, &mut txn);
        }

        Ok(txn)
    }

    /// Add a transaction at the end of a month's ROWS section
    ///
    /// Returns the record's position in ROWS.
    pub fn add(&self, month: YearMonth, txn: &Transaction) -> LedgerResult<usize> {
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let mut document = self.ledger.load_or_create_month(month)?;
        let index = document.insert_record(Section::Rows, format_transaction(txn))?;
        self.ledger.save_month(month, &document)?;

        let number = document
            .records(Section::Rows)?
            .iter()
            .position(|(i, _)| *i == index)
            .map(|p| p + 1)
            .unwrap_or(0);
        Ok(number)
    }

    /// Parse direct input and add it
    pub fn add_input(
        &self,
        month: YearMonth,
        input: &str,
        note: Option<&str>,
    ) -> LedgerResult<(usize, Transaction)> {
        let mut txn = self.parse_input(input)?;
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            txn.set_note(note.trim());
        }
        let number = self.add(month, &txn)?;
        Ok((number, txn))
    }

    /// Parse a quick entry for today and add it to the current month
    pub fn add_quick(&self, input: &str) -> LedgerResult<(YearMonth, usize, Transaction)> {
        let today = chrono::Local::now().date_naive();
        let month = YearMonth::from_date(today);

        let txn = parse_quick(
            input,
            today.day(),
            &self.ledger.settings().base_currency,
            self.ledger.currencies(),
        )?;
        let number = self.add(month, &txn)?;
        Ok((month, number, txn))
    }

    /// List a month's records
    pub fn list(&self, month: YearMonth) -> LedgerResult<MonthListing> {
        let document = self.ledger.load_month(month)?;
        let currencies = self.ledger.currencies();

        let rows = document
            .records(Section::Rows)?
            .into_iter()
            .enumerate()
            .filter_map(|(position, (index, line))| {
                parse_line(line, index + 1, currencies).map(|transaction| ListedRecord {
                    number: position + 1,
                    transaction,
                })
            })
            .collect();

        let rule_lines = match document.records(Section::Rules) {
            Ok(records) => records
                .into_iter()
                .filter_map(|(index, line)| parse_line(line, index + 1, currencies))
                .filter(|txn| !txn.is_unparsed)
                .collect(),
            Err(e) if e.is_structure() => Vec::new(),
            Err(e) => return Err(e),
        };

        let unparsed = document
            .lines()
            .iter()
            .enumerate()
            .filter_map(|(i, line)| parse_line(line, i + 1, currencies))
            .filter(|txn| txn.is_unparsed)
            .collect();

        Ok(MonthListing {
            month,
            rows,
            rule_lines,
            unparsed,
        })
    }

    /// Get the n-th ROWS record of a month
    pub fn get(&self, month: YearMonth, number: usize) -> LedgerResult<Transaction> {
        let document = self.ledger.load_month(month)?;
        let index = document
            .locate_nth_record(Section::Rows, number)?
            .ok_or_else(|| LedgerError::record_not_found(number))?;

        parse_line(&document.lines()[index], index + 1, self.ledger.currencies())
            .ok_or_else(|| LedgerError::record_not_found(number))
    }

    /// Apply changes to the n-th ROWS record
    pub fn edit(
        &self,
        month: YearMonth,
        number: usize,
        changes: TransactionEdit,
    ) -> LedgerResult<Transaction> {
        if changes.is_empty() {
            return Err(LedgerError::Validation("Nothing to change".into()));
        }

        let mut document = self.ledger.load_month(month)?;
        let index = document
            .locate_nth_record(Section::Rows, number)?
            .ok_or_else(|| LedgerError::record_not_found(number))?;

        let mut txn = parse_line(&document.lines()[index], index + 1, self.ledger.currencies())
            .ok_or_else(|| LedgerError::record_not_found(number))?;
        if txn.is_unparsed {
            return Err(LedgerError::Validation(format!(
                "Record {} does not parse ('{}'); fix it in the file first",
                number, txn.raw
            )));
        }

        self.apply(&mut txn, changes)?;
        txn.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        document.replace_line(index, format_transaction(&txn))?;
        self.ledger.save_month(month, &document)?;
        Ok(txn)
    }

    fn apply(&self, txn: &mut Transaction, changes: TransactionEdit) -> LedgerResult<()> {
        if let Some(day) = changes.day {
            txn.day = day;
        }
        if let Some(description) = changes.description {
            txn.description = description.trim().to_string();
        }
        if let Some(amount) = changes.amount {
            match parse_amount_field(&amount, self.ledger.currencies()) {
                Ok(field) => {
                    txn.amount = field.amount;
                    txn.currency = field.currency;
                    txn.rate = field.rate;
                }
                Err(AmountError::MissingCurrency(_)) => {
                    txn.amount = Money::parse(&amount)
                        .map_err(|e| LedgerError::Validation(e.to_string()))?;
                }
                Err(e) => return Err(LedgerError::Validation(e.to_string())),
            }
        }
        if let Some(tags) = changes.tags {
            txn.tags.clear();
            for tag in tags {
                txn.add_tag(tag.trim_start_matches('#'));
            }
        }
        if let Some(projects) = changes.projects {
            txn.projects.clear();
            for project in projects {
                txn.add_project(project.trim_start_matches('@'));
            }
        }
        if let Some(note) = changes.note {
            if note.trim().is_empty() {
                txn.meta.remove(crate::models::NOTE_KEY);
            } else {
                txn.set_note(note.trim());
            }
        }
        Ok(())
    }

    /// Remove the n-th ROWS record, returning the removed line
    pub fn remove(&self, month: YearMonth, number: usize) -> LedgerResult<String> {
        let mut document = self.ledger.load_month(month)?;
        let index = document
            .locate_nth_record(Section::Rows, number)?
            .ok_or_else(|| LedgerError::record_not_found(number))?;

        let removed = document.remove_line(index)?;
        self.ledger.save_month(month, &document)?;
        Ok(removed.trim().to_string())
    }
}

fn parse_day(field: &str) -> LedgerResult<u32> {
    match field.trim().parse::<u32>() {
        Ok(day) if (1..=31).contains(&day) => Ok(day),
        _ => Err(LedgerError::Validation(format!(
            "Invalid day: '{}' (expected 1-31)",
            field.trim()
        ))),
    }
}
