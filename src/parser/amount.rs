//! Amount field sub-grammar
//!
//! The third field of a record carries the amount, its currency and an
//! optional manual exchange rate: `-3,200.50 TRY @35.10`.

use std::fmt;

use crate::currency::CurrencyNormalizer;
use crate::models::{Money, MoneyParseError};

/// Parsed contents of an amount field
#[derive(Debug, Clone, PartialEq)]
pub struct AmountField {
    pub amount: Money,
    pub currency: String,
    pub rate: Option<f64>,
}

/// Why an amount field was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum AmountError {
    InvalidRate(String),
    MissingCurrency(String),
    InvalidAmount(MoneyParseError),
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRate(s) => write!(f, "Invalid rate: '{}'", s),
            Self::MissingCurrency(s) => write!(f, "No known currency in '{}'", s),
            Self::InvalidAmount(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AmountError {}

/// Parse an amount field
///
/// The trailing `@rate` marker is removed first, then the currency token,
/// and what is left goes through [`Money::parse`].
pub fn parse_amount_field(
    field: &str,
    currencies: &CurrencyNormalizer,
) -> Result<AmountField, AmountError> {
    let (rest, rate) = split_rate(field)?;

    let found = currencies
        .detect(rest)
        .ok_or_else(|| AmountError::MissingCurrency(field.trim().to_string()))?;

    let amount = Money::parse(&found.remainder).map_err(AmountError::InvalidAmount)?;

    Ok(AmountField {
        amount,
        currency: found.code,
        rate,
    })
}

/// Split off a trailing `@<number>` rate marker
///
/// The number is digits with at most one `.` or `,` decimal separator.
/// Anything else after the last `@` leaves the field untouched.
pub fn split_rate(field: &str) -> Result<(&str, Option<f64>), AmountError> {
    let trimmed = field.trim();

    let Some(at) = trimmed.rfind('@') else {
        return Ok((trimmed, None));
    };

    let candidate = &trimmed[at + 1..];
    if !is_rate_literal(candidate) {
        return Ok((trimmed, None));
    }

    let rate: f64 = candidate
        .replace(',', ".")
        .parse()
        .map_err(|_| AmountError::InvalidRate(candidate.to_string()))?;

    Ok((trimmed[..at].trim_end(), Some(rate)))
}

fn is_rate_literal(s: &str) -> bool {
    let leading_digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if leading_digits == 0 {
        return false;
    }

    let mut rest = s[leading_digits..].chars();
    match rest.next() {
        None => true,
        Some('.') | Some(',') => rest.all(|c| c.is_ascii_digit()),
        Some(_) => false,
    }
}

/// Render `-1000.00 TRY` / `1000.00 TRY @35.10`
pub fn format_amount(amount: Money, currency: &str, rate: Option<f64>) -> String {
    let mut out = format!("{} {}", amount, currency);
    if let Some(rate) = rate.filter(|r| *r > 0.0) {
        out.push_str(&format!(" @{:.2}", rate));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(field: &str) -> Result<AmountField, AmountError> {
        parse_amount_field(field, &CurrencyNormalizer::with_defaults())
    }

    #[test]
    fn test_plain_amount() {
        let f = parse("-25000 TRY").unwrap();
        assert_eq!(f.amount, Money::from_units(-25_000));
        assert_eq!(f.currency, "TRY");
        assert_eq!(f.rate, None);
    }

    #[test]
    fn test_aliases_and_thousands() {
        let f = parse("-3,200.50 TL").unwrap();
        assert_eq!(f.amount, Money::from_cents(-320_050));
        assert_eq!(f.currency, "TRY");

        let f = parse("500$").unwrap();
        assert_eq!(f.amount, Money::from_units(500));
        assert_eq!(f.currency, "USD");
    }

    #[test]
    fn test_rate_marker() {
        let f = parse("-120 USD @35.50").unwrap();
        assert_eq!(f.amount, Money::from_units(-120));
        assert_eq!(f.currency, "USD");
        assert_eq!(f.rate, Some(35.5));

        let f = parse("-120 EUR @38,25 ").unwrap();
        assert_eq!(f.rate, Some(38.25));
    }

    #[test]
    fn test_sign_collapse() {
        assert_eq!(parse("--500 TRY").unwrap().amount, Money::from_units(500));
        assert_eq!(parse("+-500 TRY").unwrap().amount, Money::from_units(500));
        assert_eq!(parse("-500 TRY").unwrap().amount, Money::from_units(-500));
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            parse("-500"),
            Err(AmountError::MissingCurrency(_))
        ));
        assert!(matches!(
            parse("abc TRY"),
            Err(AmountError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_split_rate_ignores_non_numeric_marker() {
        let (rest, rate) = split_rate("100 TRY @home").unwrap();
        assert_eq!(rest, "100 TRY @home");
        assert_eq!(rate, None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(
            format_amount(Money::from_units(-1000), "TRY", None),
            "-1000.00 TRY"
        );
        assert_eq!(
            format_amount(Money::from_cents(12_000), "USD", Some(35.5)),
            "120.00 USD @35.50"
        );
    }
}
