//! Monthly and yearly reports
//!
//! Income, expenses and net per currency, plus amounts by tag and by
//! project. Every parsed record counts, planned rule lines included.
//! Currencies are never converted into one another.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::LedgerResult;
use crate::models::{Money, Transaction, YearMonth};
use crate::storage::Ledger;

/// Income and expenses of one currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyTotals {
    pub income: Money,
    /// Stored as a positive amount
    pub expenses: Money,
    pub count: usize,
}

impl CurrencyTotals {
    /// Add a signed amount
    pub fn record(&mut self, amount: Money) {
        if amount.is_negative() {
            self.expenses += amount.abs();
        } else {
            self.income += amount;
        }
        self.count += 1;
    }

    pub fn net(&self) -> Money {
        self.income - self.expenses
    }

    pub fn merge(&mut self, other: &CurrencyTotals) {
        self.income += other.income;
        self.expenses += other.expenses;
        self.count += other.count;
    }
}

/// Totals keyed by currency code
pub type TotalsByCurrency = BTreeMap<String, CurrencyTotals>;

/// Signed sums keyed by tag or project, then currency
pub type Breakdown = BTreeMap<String, BTreeMap<String, Money>>;

/// Report for a single month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: YearMonth,
    pub totals: TotalsByCurrency,
    pub by_tag: Breakdown,
    pub by_project: Breakdown,
    pub transaction_count: usize,
    pub unparsed_count: usize,
}

impl MonthlyReport {
    /// Generate the report of a month file
    pub fn generate(ledger: &Ledger, month: YearMonth) -> LedgerResult<Self> {
        let (parsed, unparsed) = ledger.parse_month(month)?;
        Ok(Self::from_transactions(month, &parsed, unparsed.len()))
    }

    /// Aggregate already parsed records
    pub fn from_transactions(
        month: YearMonth,
        transactions: &[Transaction],
        unparsed_count: usize,
    ) -> Self {
        let mut totals = TotalsByCurrency::new();
        let mut by_tag = Breakdown::new();
        let mut by_project = Breakdown::new();

        for txn in transactions {
            totals
                .entry(txn.currency.clone())
                .or_default()
                .record(txn.amount);

            for tag in &txn.tags {
                *by_tag
                    .entry(tag.clone())
                    .or_default()
                    .entry(txn.currency.clone())
                    .or_default() += txn.amount;
            }
            for project in &txn.projects {
                *by_project
                    .entry(project.clone())
                    .or_default()
                    .entry(txn.currency.clone())
                    .or_default() += txn.amount;
            }
        }

        Self {
            month,
            totals,
            by_tag,
            by_project,
            transaction_count: transactions.len(),
            unparsed_count,
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, month_name: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Monthly Report: {} {}\n",
            month_name,
            self.month.year()
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        if self.transaction_count == 0 {
            output.push_str("No transactions.\n");
        } else {
            output.push_str(&format_totals(&self.totals));
        }

        if !self.by_tag.is_empty() {
            output.push_str("\nBy Tag\n");
            output.push_str(&format_breakdown(&self.by_tag, '#'));
        }
        if !self.by_project.is_empty() {
            output.push_str("\nBy Project\n");
            output.push_str(&format_breakdown(&self.by_project, '@'));
        }

        if self.unparsed_count > 0 {
            output.push_str(&format!(
                "\nWarning: {} unparsed line(s). Run 'spendgrid validate' for details.\n",
                self.unparsed_count
            ));
        }

        output
    }
}

/// Report for a whole year
#[derive(Debug, Clone, Serialize)]
pub struct YearlyReport {
    pub year: i32,
    /// Months that have a file, in calendar order
    pub months: Vec<MonthlyReport>,
    pub totals: TotalsByCurrency,
}

impl YearlyReport {
    /// Generate the report over every existing month file of a year
    pub fn generate(ledger: &Ledger, year: i32) -> LedgerResult<Self> {
        let months = ledger
            .existing_months(year)
            .into_iter()
            .map(|month| MonthlyReport::generate(ledger, month))
            .collect::<LedgerResult<Vec<_>>>()?;
        Ok(Self::from_months(year, months))
    }

    pub fn from_months(year: i32, months: Vec<MonthlyReport>) -> Self {
        let mut totals = TotalsByCurrency::new();
        for month in &months {
            for (currency, month_totals) in &month.totals {
                totals.entry(currency.clone()).or_default().merge(month_totals);
            }
        }
        Self {
            year,
            months,
            totals,
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Yearly Report: {}\n", self.year));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output.push_str(&format!(
            "{:<8} {:<5} {:>14} {:>14} {:>14}\n",
            "Month", "Cur", "Income", "Expenses", "Net"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for month in &self.months {
            for (currency, totals) in &month.totals {
                output.push_str(&format!(
                    "{:<8} {:<5} {:>14} {:>14} {:>14}\n",
                    month.month.to_string(),
                    currency,
                    totals.income,
                    totals.expenses,
                    totals.net()
                ));
            }
        }

        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str("TOTAL\n");
        if self.totals.is_empty() {
            output.push_str("No transactions.\n");
        } else {
            output.push_str(&format_totals(&self.totals));
        }

        output
    }
}

fn format_totals(totals: &TotalsByCurrency) -> String {
    let mut output = format!(
        "{:<5} {:>14} {:>14} {:>14} {:>6}\n",
        "Cur", "Income", "Expenses", "Net", "Count"
    );
    for (currency, t) in totals {
        output.push_str(&format!(
            "{:<5} {:>14} {:>14} {:>14} {:>6}\n",
            currency,
            t.income,
            t.expenses,
            t.net(),
            t.count
        ));
    }
    output
}

fn format_breakdown(breakdown: &Breakdown, prefix: char) -> String {
    let mut output = String::new();
    for (name, amounts) in breakdown {
        let sums: Vec<String> = amounts
            .iter()
            .map(|(currency, amount)| format!("{} {}", amount, currency))
            .collect();
        output.push_str(&format!("  {}{:<24} {}\n", prefix, name, sums.join(", ")));
    }
    output
}
