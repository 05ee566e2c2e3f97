//! Quick-entry parser
//!
//! Turns free text such as `market -100TL #food @home` or
//! `€50 dinner #fun` into a transaction. The amount may appear anywhere,
//! with the currency attached, separated by a space, or left out (the base
//! currency is used then).

use crate::currency::CurrencyNormalizer;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Transaction};

/// Description used when the text holds nothing but amount and tokens
pub const DEFAULT_DESCRIPTION: &str = "Untitled";

/// Parse a quick entry for the given day
pub fn parse_quick(
    input: &str,
    day: u32,
    base_currency: &str,
    currencies: &CurrencyNormalizer,
) -> LedgerResult<Transaction> {
    let words: Vec<&str> = input.split_whitespace().collect();

    let mut tags = Vec::new();
    let mut projects = Vec::new();
    let mut rest: Vec<&str> = Vec::new();

    for word in words {
        if let Some(tag) = token_name(word, '#') {
            tags.push(tag);
        } else if let Some(project) = token_name(word, '@') {
            projects.push(project);
        } else {
            rest.push(word);
        }
    }

    let (amount, currency, consumed) = find_amount(&rest, currencies).ok_or_else(|| {
        LedgerError::Validation(format!("No amount found in '{}'", input.trim()))
    })?;

    let description: Vec<&str> = rest
        .iter()
        .enumerate()
        .filter(|(i, _)| !consumed.contains(i))
        .map(|(_, w)| *w)
        .collect();
    let description = if description.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        description.join(" ")
    };

    let currency = currency.unwrap_or_else(|| currencies.normalize(base_currency));

    let mut txn = Transaction::new(day, description, amount, currency);
    for tag in tags {
        txn.add_tag(tag);
    }
    for project in projects {
        txn.add_project(project);
    }
    Ok(txn)
}

/// `#food,` -> `food`; a lone prefix is not a token
fn token_name(word: &str, prefix: char) -> Option<&str> {
    let name = word.strip_prefix(prefix)?;
    let end = name
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    let name = &name[..end];
    (!name.is_empty()).then_some(name)
}

fn has_digit(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
}

/// Locate the first amount among the words
///
/// Returns the amount, the currency if one was attached or adjacent, and
/// the indexes of the words used.
fn find_amount(
    words: &[&str],
    currencies: &CurrencyNormalizer,
) -> Option<(Money, Option<String>, Vec<usize>)> {
    let is_currency_word = |w: &str| {
        currencies
            .detect(w)
            .filter(|m| m.remainder.is_empty())
            .map(|m| m.code)
    };

    for (i, word) in words.iter().enumerate() {
        if !has_digit(word) {
            continue;
        }

        // Currency attached: "-100TL", "$100", "€-50"
        if let Some(found) = currencies.detect(word) {
            if let Ok(amount) = Money::parse(&found.remainder) {
                return Some((amount, Some(found.code), vec![i]));
            }
        }

        let Ok(amount) = Money::parse(word) else {
            continue;
        };

        // Currency as its own word after or before the number
        if let Some(code) = words.get(i + 1).and_then(|w| is_currency_word(*w)) {
            return Some((amount, Some(code), vec![i, i + 1]));
        }
        if let Some(code) = i
            .checked_sub(1)
            .and_then(|p| words.get(p))
            .and_then(|w| is_currency_word(*w))
        {
            return Some((amount, Some(code), vec![i - 1, i]));
        }

        return Some((amount, None, vec![i]));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(input: &str) -> LedgerResult<Transaction> {
        parse_quick(input, 12, "TRY", &CurrencyNormalizer::with_defaults())
    }

    #[test]
    fn test_attached_currency() {
        let txn = quick("-100TL market shopping #food @home").unwrap();
        assert_eq!(txn.day, 12);
        assert_eq!(txn.amount, Money::from_units(-100));
        assert_eq!(txn.currency, "TRY");
        assert_eq!(txn.description, "market shopping");
        assert_eq!(txn.tags, vec!["food"]);
        assert_eq!(txn.projects, vec!["home"]);
    }

    #[test]
    fn test_amount_in_the_middle() {
        let txn = quick("market -100 TL #food").unwrap();
        assert_eq!(txn.amount, Money::from_units(-100));
        assert_eq!(txn.currency, "TRY");
        assert_eq!(txn.description, "market");
    }

    #[test]
    fn test_symbol_before_amount() {
        let txn = quick("€50 dinner #fun @holiday").unwrap();
        assert_eq!(txn.amount, Money::from_units(50));
        assert_eq!(txn.currency, "EUR");
        assert_eq!(txn.description, "dinner");

        let txn = quick("$ 12.5 coffee").unwrap();
        assert_eq!(txn.amount, Money::from_cents(1250));
        assert_eq!(txn.currency, "USD");
        assert_eq!(txn.description, "coffee");
    }

    #[test]
    fn test_base_currency_default() {
        let txn = parse_quick("taxi -80", 3, "usd", &CurrencyNormalizer::with_defaults()).unwrap();
        assert_eq!(txn.amount, Money::from_units(-80));
        assert_eq!(txn.currency, "USD");
        assert_eq!(txn.description, "taxi");
    }

    #[test]
    fn test_tags_with_digits_are_not_amounts() {
        let txn = quick("#2026 -20 TRY bus").unwrap();
        assert_eq!(txn.tags, vec!["2026"]);
        assert_eq!(txn.amount, Money::from_units(-20));
        assert_eq!(txn.description, "bus");
    }

    #[test]
    fn test_missing_amount_is_error() {
        let err = quick("just words #tag").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_empty_description_gets_default() {
        let txn = quick("-5 TRY #misc").unwrap();
        assert_eq!(txn.description, DEFAULT_DESCRIPTION);
    }
}
