//! Currency normalization
//!
//! Maps free-form currency tokens (codes, symbols, local names) to canonical
//! codes. The alias table is a JSON object of `code -> [aliases]` kept in the
//! application data directory; a built-in table is used when it is missing.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::error::{LedgerError, LedgerResult};
use crate::storage::file_io::{read_json_optional, write_json_atomic};

/// Canonical code to accepted aliases
pub type CurrencyTable = BTreeMap<String, Vec<String>>;

/// Built-in alias table
pub fn default_table() -> CurrencyTable {
    let entries: [(&str, &[&str]); 4] = [
        ("TRY", &["TL", "₺"]),
        ("USD", &["$", "DOLAR", "DOLLAR"]),
        ("EUR", &["€", "EURO"]),
        ("GBP", &["£", "POUND"]),
    ];

    entries
        .iter()
        .map(|(code, aliases)| {
            (
                code.to_string(),
                aliases.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

/// A currency match inside a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyMatch {
    /// Canonical code
    pub code: String,
    /// The text with the matched token removed, trimmed
    pub remainder: String,
}

#[derive(Debug, Clone)]
struct Detector {
    code: String,
    pattern: Regex,
}

/// Resolves currency tokens against an alias table
#[derive(Debug, Clone)]
pub struct CurrencyNormalizer {
    table: CurrencyTable,
    detectors: Vec<Detector>,
}

impl CurrencyNormalizer {
    /// Build a normalizer over the built-in table
    pub fn with_defaults() -> Self {
        // The built-in aliases always compile
        Self::from_table(default_table()).unwrap_or_else(|_| Self {
            table: CurrencyTable::new(),
            detectors: Vec::new(),
        })
    }

    /// Build a normalizer over a custom table
    pub fn from_table(table: CurrencyTable) -> LedgerResult<Self> {
        let table: CurrencyTable = table
            .into_iter()
            .map(|(code, aliases)| {
                let code = code.trim().to_uppercase();
                let aliases = aliases
                    .into_iter()
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
                (code, aliases)
            })
            .filter(|(code, _)| !code.is_empty())
            .collect();

        let detectors = table
            .iter()
            .map(|(code, aliases)| {
                build_pattern(code, aliases).map(|pattern| Detector {
                    code: code.clone(),
                    pattern,
                })
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok(Self { table, detectors })
    }

    /// Load the alias table from a JSON file, using the built-in table if
    /// the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        match read_json_optional::<CurrencyTable, _>(path)? {
            Some(table) => Self::from_table(table),
            None => Ok(Self::with_defaults()),
        }
    }

    /// Persist the alias table as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> LedgerResult<()> {
        write_json_atomic(path, &self.table)
    }

    /// Normalize a token to its canonical code
    ///
    /// Unknown tokens come back uppercased; use [`is_known`](Self::is_known)
    /// when strict validation is needed.
    pub fn normalize(&self, token: &str) -> String {
        let upper = token.trim().to_uppercase();

        if self.table.contains_key(&upper) {
            return upper;
        }

        self.table
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a.to_uppercase() == upper))
            .map(|(code, _)| code.clone())
            .unwrap_or(upper)
    }

    /// Check if a code is in the table
    pub fn is_known(&self, code: &str) -> bool {
        self.table.contains_key(&code.trim().to_uppercase())
    }

    /// All canonical codes
    pub fn codes(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }

    /// Normalize a token, rejecting currencies that are not in the table
    pub fn resolve(&self, token: &str) -> LedgerResult<String> {
        let code = self.normalize(token);
        if self.is_known(&code) {
            Ok(code)
        } else {
            Err(LedgerError::Validation(format!(
                "Unknown currency '{}' (known: {})",
                token.trim(),
                self.codes().join(", ")
            )))
        }
    }

    /// Find the leftmost currency token in free text
    ///
    /// Codes and word aliases must not touch other letters (`TL` does not
    /// match inside `TRY`, but does in `500TL`); symbols match anywhere.
    /// Every token of the winning currency is removed from the remainder,
    /// so `100 TL TL` leaves `100`.
    pub fn detect(&self, text: &str) -> Option<CurrencyMatch> {
        let mut best: Option<(usize, usize, &Detector)> = None;

        for detector in &self.detectors {
            let Some((start, end)) = token_span(&detector.pattern, text) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((best_start, best_end, _)) => {
                    start < best_start
                        || (start == best_start && end - start > best_end - best_start)
                }
            };
            if better {
                best = Some((start, end, detector));
            }
        }

        let (start, end, detector) = best?;
        let mut remainder = format!("{}{}", &text[..start], &text[end..]);
        while let Some((start, end)) = token_span(&detector.pattern, &remainder) {
            remainder.replace_range(start..end, "");
        }

        Some(CurrencyMatch {
            code: detector.code.clone(),
            remainder: remainder.trim().to_string(),
        })
    }
}

/// Byte span of the first currency token a detector finds
fn token_span(pattern: &Regex, text: &str) -> Option<(usize, usize)> {
    let caps = pattern.captures(text)?;
    let token = caps.name("word").or_else(|| caps.name("sym"))?;
    Some((token.start(), token.end()))
}

impl Default for CurrencyNormalizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn build_pattern(code: &str, aliases: &[String]) -> LedgerResult<Regex> {
    let mut words: Vec<&str> = Vec::new();
    let mut symbols: Vec<&str> = Vec::new();

    for token in std::iter::once(code).chain(aliases.iter().map(String::as_str)) {
        if token.chars().all(char::is_alphanumeric) {
            words.push(token);
        } else {
            symbols.push(token);
        }
    }

    // Longest first so `DOLLAR` wins over `DOLAR`-style prefixes
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    symbols.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));

    let alternation =
        |tokens: &[&str]| tokens.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");

    let mut branches = Vec::new();
    if !words.is_empty() {
        branches.push(format!(
            r"(?:^|[^\p{{L}}])(?P<word>{})(?:[^\p{{L}}]|$)",
            alternation(&words)
        ));
    }
    if !symbols.is_empty() {
        branches.push(format!("(?P<sym>{})", alternation(&symbols)));
    }

    let source = format!("(?i){}", branches.join("|"));
    Regex::new(&source).map_err(|e| {
        LedgerError::Config(format!("Invalid currency aliases for {}: {}", code, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_aliases() {
        let n = CurrencyNormalizer::with_defaults();
        assert_eq!(n.normalize("TL"), "TRY");
        assert_eq!(n.normalize("tl"), "TRY");
        assert_eq!(n.normalize("₺"), "TRY");
        assert_eq!(n.normalize("$"), "USD");
        assert_eq!(n.normalize("dollar"), "USD");
        assert_eq!(n.normalize("€"), "EUR");
        assert_eq!(n.normalize(" eur "), "EUR");
    }

    #[test]
    fn test_unknown_passes_through_uppercased() {
        let n = CurrencyNormalizer::with_defaults();
        assert_eq!(n.normalize("chf"), "CHF");
        assert!(!n.is_known("CHF"));
        assert!(n.resolve("chf").is_err());
        assert_eq!(n.resolve("tl").unwrap(), "TRY");
    }

    #[test]
    fn test_detect_code_and_symbol() {
        let n = CurrencyNormalizer::with_defaults();

        let m = n.detect("-1000.00 TRY").unwrap();
        assert_eq!(m.code, "TRY");
        assert_eq!(m.remainder, "-1000.00");

        let m = n.detect("500$").unwrap();
        assert_eq!(m.code, "USD");
        assert_eq!(m.remainder, "500");

        let m = n.detect("€ 12,50").unwrap();
        assert_eq!(m.code, "EUR");
        assert_eq!(m.remainder, "12,50");
    }

    #[test]
    fn test_detect_word_boundaries() {
        let n = CurrencyNormalizer::with_defaults();

        let m = n.detect("500TL").unwrap();
        assert_eq!(m.code, "TRY");
        assert_eq!(m.remainder, "500");

        assert!(n.detect("-100 ATLAS").is_none());
        assert!(n.detect("-100").is_none());
    }

    #[test]
    fn test_detect_leftmost_wins() {
        let n = CurrencyNormalizer::with_defaults();
        let m = n.detect("100 usd market tl").unwrap();
        assert_eq!(m.code, "USD");
        assert_eq!(m.remainder, "100  market tl");
    }

    #[test]
    fn test_detect_strips_repeated_tokens() {
        let n = CurrencyNormalizer::with_defaults();

        let m = n.detect("100 TL TL").unwrap();
        assert_eq!(m.code, "TRY");
        assert_eq!(m.remainder, "100");

        let m = n.detect("tl 100 ₺").unwrap();
        assert_eq!(m.code, "TRY");
        assert_eq!(m.remainder, "100");
    }

    #[test]
    fn test_load_missing_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let n = CurrencyNormalizer::load(temp_dir.path().join("currency_maps.json")).unwrap();
        assert!(n.is_known("TRY"));
        assert!(n.is_known("GBP"));
    }

    #[test]
    fn test_save_and_load_custom_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("currency_maps.json");

        let mut table = CurrencyTable::new();
        table.insert("chf".into(), vec!["FR".into(), "franc".into()]);
        CurrencyNormalizer::from_table(table)
            .unwrap()
            .save(&path)
            .unwrap();

        let n = CurrencyNormalizer::load(&path).unwrap();
        assert_eq!(n.codes(), vec!["CHF"]);
        assert_eq!(n.normalize("Franc"), "CHF");
        assert_eq!(n.detect("20 fr").unwrap().code, "CHF");
        assert!(!n.is_known("TRY"));
    }
}
