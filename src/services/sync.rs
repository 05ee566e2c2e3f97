//! Rule synchronization
//!
//! Projects active rules into the `## RULES` section of every month from a
//! starting month through December. Lines the user has checked (`[x]`) are
//! never rewritten; unchecked lines are regenerated from the rule. Rule lines
//! are matched to rules by their name field.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::LedgerResult;
use crate::models::{Rule, YearMonth};
use crate::storage::{Ledger, MonthDocument, RuleLine, Section};

/// Counts of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Rule lines inserted
    pub added: usize,
    /// Unchecked rule lines regenerated with different content
    pub updated: usize,
    /// Checked rule lines left alone
    pub skipped: usize,
    /// Per-month failures, as `YYYY-MM: message`
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Fold one month's counts into the total
    pub fn merge(&mut self, month: MonthSync) {
        self.added += month.added;
        self.updated += month.updated;
        self.skipped += month.skipped;
    }

    /// True when the run changed at least one line
    pub fn changed_anything(&self) -> bool {
        self.added + self.updated > 0
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Counts for a single month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthSync {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Reconcile one month document against a set of rules
///
/// The `## RULES` marker is appended when missing. Every rule line after the
/// marker is a candidate; each rule claims the first unclaimed line with the
/// same name. New lines are inserted under the marker in rule order. Rules
/// that fail validation are left out, since their lines would not read back.
pub fn reconcile_month(document: &mut MonthDocument, rules: &[Rule], month: YearMonth) -> MonthSync {
    let marker = document.ensure_section(Section::Rules);

    let mut existing: Vec<(usize, RuleLine)> = document.lines()[marker + 1..]
        .iter()
        .enumerate()
        .filter_map(|(offset, line)| RuleLine::parse(line).map(|rule| (marker + 1 + offset, rule)))
        .collect();

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut insert_at = marker + 1;
    let mut counts = MonthSync::default();

    for rule in rules
        .iter()
        .filter(|r| r.applies_in_month(month) && r.validate().is_ok())
    {
        let projected = rule.format_rule_line(rule.scheduled_day(month));
        let name = rule.name.trim();

        let found = existing
            .iter()
            .find(|(index, line)| line.name == name && !claimed.contains(index))
            .map(|(index, line)| (*index, line.checkbox.is_checked()));

        match found {
            Some((index, true)) => {
                claimed.insert(index);
                counts.skipped += 1;
            }
            Some((index, false)) => {
                claimed.insert(index);
                if document.lines()[index] != projected {
                    // Index comes from the scan above, so it is in range
                    let _ = document.replace_line(index, projected);
                    counts.updated += 1;
                }
            }
            None => {
                document.insert_at(insert_at, projected);
                for (index, _) in existing.iter_mut() {
                    if *index >= insert_at {
                        *index += 1;
                    }
                }
                claimed = claimed
                    .into_iter()
                    .map(|i| if i >= insert_at { i + 1 } else { i })
                    .collect();
                claimed.insert(insert_at);
                insert_at += 1;
                counts.added += 1;
            }
        }
    }

    counts
}

/// Sync rules into every month from `start` through December of its year
///
/// A failing month is recorded in `errors` and the run continues.
pub fn sync_rules(ledger: &Ledger, rules: &[Rule], start: YearMonth) -> SyncResult {
    let mut result = SyncResult::default();

    if rules.is_empty() {
        return result;
    }

    for rule in rules {
        if let Err(e) = rule.validate() {
            result.errors.push(format!("rule {}: {}", rule.id, e));
        }
    }

    for month in start.rest_of_year() {
        match sync_month(ledger, rules, month) {
            Ok(counts) => result.merge(counts),
            Err(e) => result.errors.push(format!("{}: {}", month, e)),
        }
    }

    result
}

fn sync_month(ledger: &Ledger, rules: &[Rule], month: YearMonth) -> LedgerResult<MonthSync> {
    let existed = ledger.month_exists(month);
    let mut document = ledger.load_or_create_month(month)?;
    let before = document.to_text();

    let counts = reconcile_month(&mut document, rules, month);

    if !existed || document.to_text() != before {
        ledger.save_month(month, &document)?;
    }

    Ok(counts)
}

/// Service for rule synchronization
pub struct SyncService<'a> {
    ledger: &'a Ledger,
}

impl<'a> SyncService<'a> {
    /// Create a new sync service
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Sync active rules from the current month through December
    pub fn sync(&self) -> LedgerResult<SyncResult> {
        self.sync_from(YearMonth::current())
    }

    /// Sync active rules from the given month through December
    pub fn sync_from(&self, start: YearMonth) -> LedgerResult<SyncResult> {
        let rules = self.ledger.rules.active()?;
        Ok(sync_rules(self.ledger, &rules, start))
    }
}
