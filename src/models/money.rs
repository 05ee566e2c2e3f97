//! Money type for ledger amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point drift when
//! summing a month of records. Ledger files carry plain decimals
//! (`-1000.00`), so parsing follows the record grammar's numeric rules and
//! serialization uses a decimal number rather than raw cents.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A signed amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use spendgrid::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Create a Money amount from a float, rounding to the nearest cent
    pub fn from_f64(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the amount as a float (for rate arithmetic and JSON export)
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Get the absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Parse an amount using the ledger's numeric normalization
    ///
    /// Spaces are stripped and `,` is treated as a thousands separator. Every
    /// sign character is then dropped and a single leading `-` is restored
    /// when the count of minus-equivalents is odd. A `+` only counts as a
    /// minus-equivalent when a `-` is also present, so `+500` stays positive
    /// while `--500` and `+-500` both collapse to `500`. Digits past the
    /// second decimal place are rounded half away from zero.
    pub fn parse(input: &str) -> Result<Self, MoneyParseError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .collect();

        let minus_count = compact.chars().filter(|c| *c == '-').count();
        let plus_count = compact.chars().filter(|c| *c == '+').count();
        let sign_count = if minus_count > 0 {
            minus_count + plus_count
        } else {
            0
        };
        let digits: String = compact.chars().filter(|c| *c != '-' && *c != '+').collect();

        let magnitude = parse_unsigned_cents(&digits)
            .ok_or_else(|| MoneyParseError::InvalidFormat(input.trim().to_string()))?;

        Ok(Self(if sign_count % 2 == 1 {
            -magnitude
        } else {
            magnitude
        }))
    }
}

/// Parse `123`, `123.4`, `123.456` or `.5` into cents
fn parse_unsigned_cents(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };

    let frac_bytes = frac.as_bytes();
    let digit = |i: usize| frac_bytes.get(i).map(|b| (b - b'0') as i64).unwrap_or(0);
    let mut cents = digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        cents += 1;
    }

    whole_value.checked_mul(100)?.checked_add(cents)
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(serde::de::Error::custom("amount must be a finite number"));
        }
        Ok(Self::from_f64(value))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid amount: '{}'", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}
