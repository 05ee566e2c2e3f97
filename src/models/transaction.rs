//! Transaction model
//!
//! A transaction is one record line of a month file. It is rebuilt from the
//! text on every read; the file stays the source of truth.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::money::Money;

/// Metadata key used for a bare (keyless) metadata item
pub const NOTE_KEY: &str = "NOTE";

/// Completion marker carried by rule-derived lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checkbox {
    /// `[ ]`: planned, not yet confirmed
    Unchecked,
    /// `[x]`: confirmed by the user
    Checked,
}

impl Checkbox {
    /// Parse the exact `[ ]` / `[x]` markers
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "[ ]" => Some(Self::Unchecked),
            "[x]" => Some(Self::Checked),
            _ => None,
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Self::Unchecked => "[ ]",
            Self::Checked => "[x]",
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Checked)
    }
}

impl fmt::Display for Checkbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// A ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Day of month (1-31)
    pub day: u32,

    pub description: String,

    /// Signed amount: negative is an expense, positive is income
    pub amount: Money,

    /// Normalized currency code
    pub currency: String,

    /// Optional manual exchange rate (`@rate`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Tags in order of appearance, without the `#`
    #[serde(default)]
    pub tags: Vec<String>,

    /// Projects in order of appearance, without the `@`
    #[serde(default)]
    pub projects: Vec<String>,

    /// Free-form metadata
    #[serde(default)]
    pub meta: BTreeMap<String, String>,

    /// Checkbox state, present only on rule-derived lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<Checkbox>,

    /// Original line text (trimmed)
    #[serde(default)]
    pub raw: String,

    /// True when the line looked like a record but did not fit the grammar.
    /// Only `raw` and `line_number` are reliable in that case.
    #[serde(default)]
    pub is_unparsed: bool,

    /// 1-based line number in the month file
    #[serde(default)]
    pub line_number: usize,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        day: u32,
        description: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            day,
            description: description.into(),
            amount,
            currency: currency.into(),
            rate: None,
            tags: Vec::new(),
            projects: Vec::new(),
            meta: BTreeMap::new(),
            checkbox: None,
            raw: String::new(),
            is_unparsed: false,
            line_number: 0,
        }
    }

    /// Create a placeholder for a line that did not fit the grammar
    pub fn unparsed(raw: impl Into<String>, line_number: usize) -> Self {
        Self {
            raw: raw.into(),
            is_unparsed: true,
            line_number,
            ..Self::new(0, "", Money::zero(), "")
        }
    }

    /// Check if this is an expense (outflow)
    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    /// Check if this is income (inflow)
    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    /// Check if this line came from a rule (carries a checkbox)
    pub fn is_rule_line(&self) -> bool {
        self.checkbox.is_some()
    }

    /// A plain row or a checked rule line counts as done
    pub fn is_completed(&self) -> bool {
        self.checkbox.map_or(true, |c| c.is_checked())
    }

    /// Add a tag, ignoring duplicates
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Add a project, ignoring duplicates
    pub fn add_project(&mut self, project: impl Into<String>) {
        let project = project.into();
        if !project.is_empty() && !self.projects.contains(&project) {
            self.projects.push(project);
        }
    }

    pub fn note(&self) -> Option<&str> {
        self.meta.get(NOTE_KEY).map(String::as_str)
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.meta.insert(NOTE_KEY.to_string(), note.into());
    }

    /// Validate the fields a formatted line depends on
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !(1..=31).contains(&self.day) {
            return Err(TransactionValidationError::InvalidDay(self.day));
        }
        if self.description.trim().is_empty() {
            return Err(TransactionValidationError::EmptyDescription);
        }
        if self.description.contains('|') {
            return Err(TransactionValidationError::PipeInDescription);
        }
        if !brackets_balanced(&self.description) || has_line_break(&self.description) {
            return Err(TransactionValidationError::InvalidDescription(
                self.description.clone(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(TransactionValidationError::MissingCurrency);
        }
        if let Some(token) = self
            .tags
            .iter()
            .chain(self.projects.iter())
            .find(|t| t.contains(TOKEN_BREAKERS) || t.chars().any(char::is_whitespace))
        {
            return Err(TransactionValidationError::InvalidToken(token.clone()));
        }
        for (key, value) in &self.meta {
            if key.trim().is_empty() || key.contains(':') || key.contains(META_BREAKERS) {
                return Err(TransactionValidationError::InvalidMetaKey(key.clone()));
            }
            if value.contains(META_BREAKERS) {
                return Err(TransactionValidationError::InvalidMetaValue(value.clone()));
            }
        }
        Ok(())
    }
}

/// Characters a tag or project cannot hold
const TOKEN_BREAKERS: &[char] = &['|', '[', ']'];

/// Characters that would end a metadata item or the metadata list
const META_BREAKERS: &[char] = &[',', '[', ']', '\n', '\r'];

/// Check that every `]` closes an earlier `[`
///
/// Field splitting ignores `|` inside brackets, so an unclosed `[` in a
/// description or rule name would swallow the rest of the line.
pub(crate) fn brackets_balanced(text: &str) -> bool {
    let mut depth: usize = 0;
    for c in text.chars() {
        match c {
            '[' => depth += 1,
            ']' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

pub(crate) fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unparsed {
            return write!(f, "{}", self.raw);
        }
        write!(
            f,
            "{:02} {} {} {}",
            self.day, self.description, self.amount, self.currency
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    InvalidDay(u32),
    EmptyDescription,
    PipeInDescription,
    InvalidDescription(String),
    MissingCurrency,
    InvalidToken(String),
    InvalidMetaKey(String),
    InvalidMetaValue(String),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDay(day) => write!(f, "Invalid day: {} (expected 1-31)", day),
            Self::EmptyDescription => write!(f, "Description cannot be empty"),
            Self::PipeInDescription => write!(f, "Description cannot contain '|'"),
            Self::InvalidDescription(text) => write!(
                f,
                "Description '{}' has an unclosed bracket or a line break",
                text
            ),
            Self::MissingCurrency => write!(f, "Currency is required"),
            Self::InvalidToken(token) => write!(
                f,
                "Tag or project '{}' cannot contain spaces, '|', '[' or ']'",
                token
            ),
            Self::InvalidMetaKey(key) => write!(
                f,
                "Metadata key '{}' must be non-empty without ':', ',', '[' or ']'",
                key
            ),
            Self::InvalidMetaValue(value) => write!(
                f,
                "Metadata value '{}' cannot contain ',', '[' or ']'",
                value
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let txn = Transaction::new(5, "Market", Money::from_cents(-12050), "TRY");
        assert!(txn.is_expense());
        assert!(!txn.is_income());
        assert!(!txn.is_rule_line());
        assert!(txn.is_completed());
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_unparsed_placeholder() {
        let txn = Transaction::unparsed("- broken | line", 7);
        assert!(txn.is_unparsed);
        assert_eq!(txn.raw, "- broken | line");
        assert_eq!(txn.line_number, 7);
        assert_eq!(txn.to_string(), "- broken | line");
    }

    #[test]
    fn test_tags_deduplicated_in_order() {
        let mut txn = Transaction::new(1, "x", Money::zero(), "TRY");
        txn.add_tag("food");
        txn.add_tag("home");
        txn.add_tag("food");
        txn.add_project("trip");
        txn.add_project("trip");
        assert_eq!(txn.tags, vec!["food", "home"]);
        assert_eq!(txn.projects, vec!["trip"]);
    }

    #[test]
    fn test_checkbox_completion() {
        let mut txn = Transaction::new(1, "Rent", Money::from_units(-1000), "TRY");
        txn.checkbox = Some(Checkbox::Unchecked);
        assert!(txn.is_rule_line());
        assert!(!txn.is_completed());

        txn.checkbox = Some(Checkbox::Checked);
        assert!(txn.is_completed());
    }

    #[test]
    fn test_checkbox_markers() {
        assert_eq!(Checkbox::from_marker("[ ]"), Some(Checkbox::Unchecked));
        assert_eq!(Checkbox::from_marker("[x]"), Some(Checkbox::Checked));
        assert_eq!(Checkbox::from_marker("[X]"), None);
        assert_eq!(Checkbox::Checked.to_string(), "[x]");
    }

    #[test]
    fn test_validation() {
        let mut txn = Transaction::new(0, "x", Money::zero(), "TRY");
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::InvalidDay(0))
        );

        txn.day = 3;
        txn.description = "a | b".into();
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::PipeInDescription)
        );

        txn.description = "ok".into();
        txn.currency = String::new();
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::MissingCurrency)
        );
    }

    #[test]
    fn test_brackets_balanced() {
        assert!(brackets_balanced("Cafe"));
        assert!(brackets_balanced("Gym [rent_1]"));
        assert!(brackets_balanced("a [b [c]] d"));
        assert!(!brackets_balanced("Cafe [promo"));
        assert!(!brackets_balanced("promo] x"));
        assert!(!brackets_balanced("]["));
    }

    #[test]
    fn test_validation_rejects_line_breaking_text() {
        let mut txn = Transaction::new(3, "Cafe [promo", Money::from_units(-10), "TRY");
        assert!(matches!(
            txn.validate(),
            Err(TransactionValidationError::InvalidDescription(_))
        ));

        txn.description = "Cafe [promo]".into();
        assert!(txn.validate().is_ok());

        txn.add_tag("a|b");
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::InvalidToken("a|b".into()))
        );
    }

    #[test]
    fn test_validation_rejects_meta_separators() {
        let mut txn = Transaction::new(3, "Cafe", Money::from_units(-10), "TRY");
        txn.set_note("with Ali, Ayse");
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::InvalidMetaValue(
                "with Ali, Ayse".into()
            ))
        );

        txn.set_note("with Ali and Ayse | split bill");
        assert!(txn.validate().is_ok());

        txn.meta.insert("A:B".into(), "x".into());
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::InvalidMetaKey("A:B".into()))
        );
    }

    #[test]
    fn test_note() {
        let mut txn = Transaction::new(1, "x", Money::zero(), "TRY");
        assert_eq!(txn.note(), None);
        txn.set_note("paid cash");
        assert_eq!(txn.note(), Some("paid cash"));
    }
}
