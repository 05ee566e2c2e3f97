//! Recurring rule model
//!
//! A rule is a monthly income or expense template. Its projection into a
//! month file (a `- [ ] DD | Name | ...` line) is derived data that sync can
//! regenerate at any time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::money::Money;
use super::period::YearMonth;
use super::transaction::{brackets_balanced, has_line_break};

/// Frequency value accepted by applicability
pub const MONTHLY: &str = "monthly";

/// Rule identifier: a slug of the name plus a uniqueness suffix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate an id from a name and the current time
    pub fn generate(name: &str, existing: &[RuleId]) -> Self {
        Self::generate_at(name, chrono::Utc::now().timestamp(), existing)
    }

    /// Generate an id from a name and a timestamp
    ///
    /// ASCII letters are lowercased, digits kept, spaces become `_`, and
    /// everything else is dropped; `_<timestamp>` follows. A counter is
    /// appended if the result is already taken.
    pub fn generate_at(name: &str, timestamp: i64, existing: &[RuleId]) -> Self {
        let slug: String = name
            .chars()
            .filter_map(|c| match c {
                'A'..='Z' => Some(c.to_ascii_lowercase()),
                'a'..='z' | '0'..='9' => Some(c),
                ' ' => Some('_'),
                _ => None,
            })
            .collect();

        let base = format!("{}_{}", slug, timestamp);
        let taken = |candidate: &str| existing.iter().any(|id| id.as_str() == candidate);

        if !taken(&base) {
            return Self(base);
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{}_{}", base, counter);
            if !taken(&candidate) {
                return Self(candidate);
            }
            counter += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a rule brings money in or takes it out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Income,
    #[default]
    Expense,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl std::str::FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "inc" => Ok(Self::Income),
            "expense" | "exp" => Ok(Self::Expense),
            other => Err(format!("Invalid rule type '{}': use income or expense", other)),
        }
    }
}

/// When a rule is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Only `monthly` (or empty) is applied
    #[serde(default = "default_frequency")]
    pub frequency: String,

    /// Day of month (1-31), clamped per month
    #[serde(default = "default_day")]
    pub day: u32,
}

fn default_frequency() -> String {
    MONTHLY.to_string()
}

fn default_day() -> u32 {
    1
}

impl Schedule {
    pub fn monthly(day: u32) -> Self {
        Self {
            frequency: default_frequency(),
            day,
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::monthly(default_day())
    }
}

fn default_active() -> bool {
    true
}

/// A recurring income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,

    pub name: String,

    /// Stored amount; the sign is normalized when projected
    pub amount: Money,

    pub currency: String,

    #[serde(rename = "type", default)]
    pub rule_type: RuleType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default)]
    pub schedule: Schedule,

    #[serde(default = "default_active")]
    pub active: bool,

    /// First month of the rule. Stored only; applicability ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<YearMonth>,

    /// Last month of the rule. Stored only; applicability ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<YearMonth>,

    /// Total for installment-style rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Money>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Rule {
    /// Create a new active monthly rule
    pub fn new(
        id: RuleId,
        name: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
        rule_type: RuleType,
        day: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            currency: currency.into(),
            rule_type,
            category: None,
            tags: Vec::new(),
            project: None,
            schedule: Schedule::monthly(day),
            active: true,
            start_date: None,
            end_date: None,
            total_amount: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Check whether the rule projects into the given month
    ///
    /// Inactive rules and non-monthly frequencies never apply. The
    /// `start_date`/`end_date` range is not consulted.
    pub fn applies_in_month(&self, _month: YearMonth) -> bool {
        if !self.active {
            return false;
        }
        let frequency = self.schedule.frequency.trim();
        frequency.is_empty() || frequency.eq_ignore_ascii_case(MONTHLY)
    }

    /// The schedule day clamped into the given month
    pub fn scheduled_day(&self, month: YearMonth) -> u32 {
        month.clamp_day(self.schedule.day)
    }

    /// True when the projected line carries a minus sign
    pub fn is_outflow(&self) -> bool {
        self.rule_type == RuleType::Expense || self.amount.is_negative()
    }

    /// The signed amount a projected line carries
    pub fn projected_amount(&self) -> Money {
        if self.is_outflow() {
            -self.amount.abs()
        } else {
            self.amount.abs()
        }
    }

    /// Render the unchecked rule line for a day
    ///
    /// `- [ ] DD | Name | -1000.00 TRY | #tag @project`
    pub fn format_rule_line(&self, day: u32) -> String {
        let mut tokens = String::new();
        for tag in &self.tags {
            tokens.push_str(" #");
            tokens.push_str(tag);
        }
        if let Some(project) = self.project.as_deref().filter(|p| !p.is_empty()) {
            tokens.push_str(" @");
            tokens.push_str(project);
        }

        format!(
            "- [ ] {:02} | {} | {} {} |{}",
            day,
            self.name,
            self.projected_amount(),
            self.currency,
            tokens
        )
    }

    /// Validate the rule
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(RuleValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(RuleValidationError::EmptyName);
        }
        if self.name.contains('|') {
            return Err(RuleValidationError::PipeInName);
        }
        if !brackets_balanced(&self.name) || has_line_break(&self.name) {
            return Err(RuleValidationError::InvalidName(self.name.clone()));
        }
        if self.currency.trim().is_empty() {
            return Err(RuleValidationError::MissingCurrency);
        }
        if let Some(token) = self
            .tags
            .iter()
            .chain(self.project.iter())
            .find(|t| t.contains(['|', '[', ']']) || t.chars().any(char::is_whitespace))
        {
            return Err(RuleValidationError::InvalidToken(token.clone()));
        }
        if !(1..=31).contains(&self.schedule.day) {
            return Err(RuleValidationError::InvalidDay(self.schedule.day));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(RuleValidationError::InvalidRange(start, end));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Validation errors for rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValidationError {
    EmptyId,
    EmptyName,
    PipeInName,
    InvalidName(String),
    MissingCurrency,
    InvalidToken(String),
    InvalidDay(u32),
    InvalidRange(YearMonth, YearMonth),
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Rule id cannot be empty"),
            Self::EmptyName => write!(f, "Rule name cannot be empty"),
            Self::PipeInName => write!(f, "Rule name cannot contain '|'"),
            Self::InvalidName(name) => write!(
                f,
                "Rule name '{}' has an unclosed bracket or a line break",
                name
            ),
            Self::MissingCurrency => write!(f, "Currency is required"),
            Self::InvalidToken(token) => write!(
                f,
                "Tag or project '{}' cannot contain spaces, '|', '[' or ']'",
                token
            ),
            Self::InvalidDay(day) => write!(f, "Invalid schedule day: {} (expected 1-31)", day),
            Self::InvalidRange(start, end) => {
                write!(f, "End date {} is before start date {}", end, start)
            }
        }
    }
}

impl std::error::Error for RuleValidationError {}
