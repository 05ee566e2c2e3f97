//! Transaction display formatting
//!
//! Formats month listings and single records for terminal output.

use crate::models::Transaction;
use crate::services::{ListedRecord, MonthListing};

/// Format a record as a listing row
pub fn format_transaction_row(txn: &Transaction) -> String {
    let status = match txn.checkbox {
        Some(checkbox) if checkbox.is_checked() => "✓",
        Some(_) => "○",
        None => " ",
    };

    let mut tokens: Vec<String> = txn.tags.iter().map(|t| format!("#{}", t)).collect();
    tokens.extend(txn.projects.iter().map(|p| format!("@{}", p)));

    let rate = txn.rate.map(|r| format!(" @{:.2}", r)).unwrap_or_default();

    format!(
        "{} {:02}  {:<28} {:>12} {:<4}{}  {}",
        status,
        txn.day,
        truncate(&txn.description, 28),
        txn.amount.to_string(),
        txn.currency,
        rate,
        tokens.join(" ")
    )
    .trim_end()
    .to_string()
}

/// Format a month listing: numbered ROWS records, rule lines, unparsed lines
pub fn format_month_listing(listing: &MonthListing, month_name: &str) -> String {
    let mut output = format!("{} {}\n", month_name, listing.month.year());

    if listing.rows.is_empty() {
        output.push_str("No transactions found.\n");
    } else {
        output.push_str(&format!(
            "{:>4}  {:<2} {:<28} {:>12} {:<4}  {}\n",
            "#", "Day", "Description", "Amount", "Cur", "Tags"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');
        for record in &listing.rows {
            if record.transaction.is_unparsed {
                output.push_str(&format!(
                    "{:>4}  ! {}\n",
                    record.number, record.transaction.raw
                ));
            } else {
                output.push_str(&format!(
                    "{:>4}  {}\n",
                    record.number,
                    format_transaction_row(&record.transaction)
                ));
            }
        }
    }

    if !listing.rule_lines.is_empty() {
        output.push_str("\nRules\n");
        for txn in &listing.rule_lines {
            output.push_str(&format!("      {}\n", format_transaction_row(txn)));
        }
    }

    if !listing.unparsed.is_empty() {
        output.push_str(&format!("\nUnparsed lines ({}):\n", listing.unparsed.len()));
        for txn in &listing.unparsed {
            output.push_str(&format!("  line {}: {}\n", txn.line_number, txn.raw));
        }
    }

    output
}

/// Format the pool backlog
pub fn format_pool_listing(items: &[ListedRecord]) -> String {
    if items.is_empty() {
        return "The pool is empty.\n".to_string();
    }

    let mut output = String::from("Pool\n");
    output.push_str(&"-".repeat(70));
    output.push('\n');

    let mut unparsed = 0;
    for item in items {
        if item.transaction.is_unparsed {
            unparsed += 1;
            output.push_str(&format!("{:>4}  ! {}\n", item.number, item.transaction.raw));
        } else {
            output.push_str(&format!(
                "{:>4}  {}\n",
                item.number,
                format_transaction_row(&item.transaction)
            ));
        }
    }

    if unparsed > 0 {
        output.push_str(&format!(
            "\n{} item(s) marked ! do not parse and cannot be moved.\n",
            unparsed
        ));
    }

    output
}

/// Format record details for display
pub fn format_transaction_details(txn: &Transaction) -> String {
    let mut output = String::new();

    output.push_str(&format!("Day:         {:02}\n", txn.day));
    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!("Amount:      {} {}\n", txn.amount, txn.currency));

    if let Some(rate) = txn.rate {
        output.push_str(&format!("Rate:        {:.2}\n", rate));
    }
    if !txn.tags.is_empty() {
        output.push_str(&format!("Tags:        {}\n", txn.tags.join(", ")));
    }
    if !txn.projects.is_empty() {
        output.push_str(&format!("Projects:    {}\n", txn.projects.join(", ")));
    }
    if let Some(note) = txn.note() {
        output.push_str(&format!("Note:        {}\n", note));
    }
    for (key, value) in txn.meta.iter().filter(|(k, _)| k.as_str() != crate::models::NOTE_KEY) {
        output.push_str(&format!("{:<12} {}\n", format!("{}:", key), value));
    }
    if let Some(checkbox) = txn.checkbox {
        output.push_str(&format!("Status:      {}\n", checkbox));
    }

    output
}

/// Truncate a string to a maximum number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
