//! Record grammar
//!
//! One record per line:
//!
//! ```text
//! - [CHECKBOX ]DAY | DESCRIPTION | [±]AMOUNT CURRENCY[ @RATE] | #tags @projects | [META]
//! ```
//!
//! Lines that are blank, headings (`#`) or do not start with `-` are not
//! records. A `-` line that does not fit the grammar is kept as an unparsed
//! transaction instead of failing, so it can be listed and fixed later.

use crate::currency::CurrencyNormalizer;
use crate::models::{Checkbox, Transaction, NOTE_KEY};

use super::amount::{format_amount, parse_amount_field};

/// Minimum number of `|`-separated fields of a record
pub const MIN_FIELDS: usize = 4;

/// Parse one line of a month file
///
/// Returns `None` for lines that are not records at all.
pub fn parse_line(
    line: &str,
    line_number: usize,
    currencies: &CurrencyNormalizer,
) -> Option<Transaction> {
    let line = line.trim();

    if line.is_empty() || line.starts_with('#') || !line.starts_with('-') {
        return None;
    }

    let mut content = line[1..].trim_start();
    let mut checkbox = None;
    if let Some(marker) = content.get(..3).and_then(Checkbox::from_marker) {
        checkbox = Some(marker);
        content = content[3..].trim_start();
    }

    let fields = split_fields(content);
    if fields.len() < MIN_FIELDS {
        return Some(Transaction::unparsed(line, line_number));
    }

    let day = match fields[0].parse::<u32>() {
        Ok(day) if (1..=31).contains(&day) => day,
        _ => return Some(Transaction::unparsed(line, line_number)),
    };

    let amount = match parse_amount_field(&fields[2], currencies) {
        Ok(amount) => amount,
        Err(_) => return Some(Transaction::unparsed(line, line_number)),
    };

    let mut txn = Transaction::new(day, fields[1].as_str(), amount.amount, amount.currency);
    txn.rate = amount.rate;
    txn.checkbox = checkbox;
    txn.raw = line.to_string();
    txn.line_number = line_number;

    parse_tokens(&fields[3], &mut txn);
    if let Some(meta) = fields.get(4) {
        parse_meta(meta, &mut txn);
    }

    Some(txn)
}

/// Split on `|`, except inside `[...]`
///
/// Every field is trimmed. A trailing empty field after the last `|` is
/// kept, so `a | b | c |` has four fields.
pub fn split_fields(content: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for c in content.chars() {
        match c {
            '|' if depth == 0 => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Collect `#tag` and `@project` tokens
pub fn parse_tokens(field: &str, txn: &mut Transaction) {
    for word in field.split_whitespace() {
        if let Some(tag) = word.strip_prefix('#') {
            txn.add_tag(tag);
        } else if let Some(project) = word.strip_prefix('@') {
            txn.add_project(project);
        }
    }
}

/// Parse a `[KEY:VALUE,KEY:VALUE]` list into the transaction's metadata
///
/// A bare item is stored under `NOTE`; the last bare item wins.
pub fn parse_meta(field: &str, txn: &mut Transaction) {
    let field = field.trim();
    let Some(inner) = field.strip_prefix('[').and_then(|f| f.strip_suffix(']')) else {
        return;
    };

    for item in inner.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        match item.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                txn.meta
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => {
                txn.meta.insert(NOTE_KEY.to_string(), item.to_string());
            }
        }
    }
}

/// Render a transaction as a record line
///
/// The inverse of [`parse_line`] up to formatting: amounts are printed with
/// two decimals and no thousands separators, metadata keys sorted.
pub fn format_transaction(txn: &Transaction) -> String {
    let mut line = match txn.checkbox {
        Some(checkbox) => format!("- {} ", checkbox),
        None => "- ".to_string(),
    };
    line.push_str(&format!(
        "{:02} | {} | {} |",
        txn.day,
        txn.description,
        format_amount(txn.amount, &txn.currency, txn.rate)
    ));

    for tag in &txn.tags {
        line.push_str(" #");
        line.push_str(tag);
    }
    for project in &txn.projects {
        line.push_str(" @");
        line.push_str(project);
    }

    if !txn.meta.is_empty() {
        let items: Vec<String> = txn
            .meta
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect();
        line.push_str(&format!(" | [{}]", items.join(",")));
    }

    line
}

/// Parse every record of a month file
///
/// Returns the parsed records and the unparsed ones, both in file order.
pub fn parse_month_file(
    content: &str,
    currencies: &CurrencyNormalizer,
) -> (Vec<Transaction>, Vec<Transaction>) {
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(line, i + 1, currencies))
        .partition(|txn| !txn.is_unparsed)
}
