//! Calendar month addressing
//!
//! Every month of the ledger lives in its own file (`<year>/<MM>.md`), so the
//! month is the unit most operations are keyed on.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::settings::Locale;
use crate::error::LedgerError;

const MONTH_NAMES_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_NAMES_TR: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// A calendar month (e.g., "2026-10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a month, validating the month number
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::Validation(format!(
                "Invalid month: {} (expected 1-12)",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current local month
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month (28-31)
    pub fn last_day(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .map(|d| d.day())
            .unwrap_or(31)
    }

    /// Clamp a day number into this month (0 becomes 1, 31 in April becomes 30)
    pub fn clamp_day(&self, day: u32) -> u32 {
        day.clamp(1, self.last_day())
    }

    /// All months from this one through December of the same year
    pub fn rest_of_year(&self) -> impl Iterator<Item = YearMonth> {
        let year = self.year;
        (self.month..=12).map(move |month| YearMonth { year, month })
    }

    /// All twelve months of a year
    pub fn months_of(year: i32) -> impl Iterator<Item = YearMonth> {
        (1..=12).map(move |month| YearMonth { year, month })
    }

    /// Month file name within the year directory ("04.md")
    pub fn file_name(&self) -> String {
        format!("{:02}.md", self.month)
    }

    /// Localized month name
    pub fn month_name(&self, locale: Locale) -> &'static str {
        let index = (self.month - 1) as usize;
        match locale {
            Locale::En => MONTH_NAMES_EN[index],
            Locale::Tr => MONTH_NAMES_TR[index],
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = LedgerError;

    /// Parse "YYYY-MM"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::Validation(format!("Invalid month '{}': use YYYY-MM", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2026-04".parse().unwrap();
        assert_eq!(ym.year(), 2026);
        assert_eq!(ym.month(), 4);
        assert_eq!(ym.to_string(), "2026-04");
        assert_eq!(ym.file_name(), "04.md");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("2026-00".parse::<YearMonth>().is_err());
        assert!("26-01".parse::<YearMonth>().is_err());
        assert!("2026/01".parse::<YearMonth>().is_err());
        assert!("".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_last_day() {
        assert_eq!(YearMonth::new(2026, 1).unwrap().last_day(), 31);
        assert_eq!(YearMonth::new(2026, 4).unwrap().last_day(), 30);
        assert_eq!(YearMonth::new(2026, 2).unwrap().last_day(), 28);
        assert_eq!(YearMonth::new(2024, 2).unwrap().last_day(), 29);
        assert_eq!(YearMonth::new(2026, 12).unwrap().last_day(), 31);
    }

    #[test]
    fn test_clamp_day() {
        let april = YearMonth::new(2026, 4).unwrap();
        assert_eq!(april.clamp_day(31), 30);
        assert_eq!(april.clamp_day(0), 1);
        assert_eq!(april.clamp_day(15), 15);
    }

    #[test]
    fn test_rest_of_year() {
        let months: Vec<_> = YearMonth::new(2026, 10).unwrap().rest_of_year().collect();
        assert_eq!(months.len(), 3);
        assert_eq!(months[0].month(), 10);
        assert_eq!(months[2].month(), 12);
    }

    #[test]
    fn test_month_names() {
        let ym = YearMonth::new(2026, 2).unwrap();
        assert_eq!(ym.month_name(Locale::En), "February");
        assert_eq!(ym.month_name(Locale::Tr), "Şubat");
    }

    #[test]
    fn test_serde_as_string() {
        let ym = YearMonth::new(2026, 3).unwrap();
        let yaml = serde_yaml::to_string(&ym).unwrap();
        assert_eq!(yaml.trim(), "2026-03");
        let back: YearMonth = serde_yaml::from_str("2026-03").unwrap();
        assert_eq!(back, ym);
    }
}
