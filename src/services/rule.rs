//! Rule service
//!
//! Business logic for recurring rules: creation with id generation,
//! editing, activation, and checking off their projected lines in month
//! files.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Checkbox, Money, Rule, RuleId, RuleType, YearMonth};
use crate::parser::{parse_amount_field, AmountError};
use crate::storage::Ledger;

/// Input for a new rule
#[derive(Debug, Clone, Default)]
pub struct NewRule {
    pub name: String,
    /// Amount text, optionally with a currency (`-1000`, `-1000 TL`)
    pub amount: String,
    /// Currency when the amount text has none; the base currency otherwise
    pub currency: Option<String>,
    /// Defaults to expense for negative amounts, income otherwise
    pub rule_type: Option<RuleType>,
    pub day: u32,
    pub tags: Vec<String>,
    pub project: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<YearMonth>,
    pub end_date: Option<YearMonth>,
    pub total_amount: Option<String>,
    pub inactive: bool,
}

/// Field changes for a rule; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct RuleEdit {
    pub name: Option<String>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub rule_type: Option<RuleType>,
    pub day: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub project: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<YearMonth>,
    pub end_date: Option<YearMonth>,
}

/// Where a completion toggle landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionChange {
    pub month: YearMonth,
    /// 1-based line number in the month file
    pub line_number: usize,
    pub line: String,
}

/// Service for rule management
pub struct RuleService<'a> {
    ledger: &'a Ledger,
}

impl<'a> RuleService<'a> {
    /// Create a new rule service
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// All rules in file order
    pub fn list(&self) -> LedgerResult<Vec<Rule>> {
        self.ledger.rules.get_all()
    }

    /// Get a rule by id
    pub fn get(&self, id: &str) -> LedgerResult<Rule> {
        self.ledger
            .rules
            .get(id)?
            .ok_or_else(|| LedgerError::rule_not_found(id))
    }

    /// Create and persist a rule
    pub fn add(&self, input: NewRule) -> LedgerResult<Rule> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("Rule name cannot be empty".into()));
        }

        let (amount, currency) = self.parse_amount(&input.amount, input.currency.as_deref())?;
        let rule_type = input.rule_type.unwrap_or(if amount.is_negative() {
            RuleType::Expense
        } else {
            RuleType::Income
        });

        let id = RuleId::generate(name, &self.ledger.rules.ids()?);
        let mut rule = Rule::new(id, name, amount, currency, rule_type, input.day);
        rule.tags = clean_tokens(input.tags, '#');
        rule.project = clean_optional(input.project, '@');
        rule.category = clean_optional(input.category, '#');
        rule.start_date = input.start_date;
        rule.end_date = input.end_date;
        rule.active = !input.inactive;
        if let Some(total) = input.total_amount {
            rule.total_amount = Some(
                Money::parse(&total).map_err(|e| LedgerError::Validation(e.to_string()))?,
            );
        }

        rule.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.ledger.rules.add(rule.clone())?;
        self.ledger.rules.save()?;
        Ok(rule)
    }

    /// Apply changes to a rule
    pub fn edit(&self, id: &str, changes: RuleEdit) -> LedgerResult<Rule> {
        let mut rule = self.get(id)?;

        if let Some(name) = changes.name {
            rule.name = name.trim().to_string();
        }
        if let Some(amount) = changes.amount {
            let fallback = changes.currency.clone().unwrap_or_else(|| rule.currency.clone());
            let (amount, currency) = self.parse_amount(&amount, Some(&fallback))?;
            rule.amount = amount;
            rule.currency = currency;
        } else if let Some(currency) = changes.currency {
            rule.currency = self.ledger.currencies().resolve(&currency)?;
        }
        if let Some(rule_type) = changes.rule_type {
            rule.rule_type = rule_type;
        }
        if let Some(day) = changes.day {
            rule.schedule.day = day;
        }
        if let Some(tags) = changes.tags {
            rule.tags = clean_tokens(tags, '#');
        }
        if let Some(project) = changes.project {
            rule.project = clean_optional(Some(project), '@');
        }
        if let Some(category) = changes.category {
            rule.category = clean_optional(Some(category), '#');
        }
        if changes.start_date.is_some() {
            rule.start_date = changes.start_date;
        }
        if changes.end_date.is_some() {
            rule.end_date = changes.end_date;
        }

        rule.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.ledger.rules.update(id, rule.clone())?;
        self.ledger.rules.save()?;
        Ok(rule)
    }

    /// Flip a rule between active and inactive
    pub fn toggle(&self, id: &str) -> LedgerResult<Rule> {
        self.ledger.rules.toggle(id)?;
        self.ledger.rules.save()?;
        self.get(id)
    }

    /// Delete a rule; lines already projected into month files stay
    pub fn remove(&self, id: &str) -> LedgerResult<Rule> {
        let rule = self.ledger.rules.delete(id)?;
        self.ledger.rules.save()?;
        Ok(rule)
    }

    /// Set the checkbox of a rule's line
    ///
    /// A line belongs to the rule when its name field carries the `[id]`
    /// token or equals the rule's name. Months of `year` are searched from
    /// January unless `month` is given; the first line not already in the
    /// requested state is changed.
    pub fn set_completion(
        &self,
        id: &str,
        checkbox: Checkbox,
        year: i32,
        month: Option<YearMonth>,
    ) -> LedgerResult<CompletionChange> {
        let name = self.ledger.rules.get(id)?.map(|r| r.name.trim().to_string());

        let months = match month {
            Some(month) => vec![month],
            None => self.ledger.existing_months(year),
        };

        for month in months {
            let mut document = self.ledger.load_month(month)?;
            let changed = document.set_rule_checkbox(checkbox, |line| {
                line.checkbox != checkbox
                    && (line.carries_id(id) || name.as_deref() == Some(line.name.as_str()))
            });

            let index = match changed {
                Ok(Some(index)) => index,
                Ok(None) => continue,
                Err(e) if e.is_structure() => continue,
                Err(e) => return Err(e),
            };

            self.ledger.save_month(month, &document)?;
            return Ok(CompletionChange {
                month,
                line_number: index + 1,
                line: document.lines()[index].trim().to_string(),
            });
        }

        if name.is_none() {
            return Err(LedgerError::rule_not_found(id));
        }
        Err(LedgerError::NotFound {
            entity_type: "Rule line",
            identifier: match checkbox {
                Checkbox::Checked => format!("unchecked line for {}", id),
                Checkbox::Unchecked => format!("checked line for {}", id),
            },
        })
    }

    /// Check every unchecked rule line of a month, returning the count
    pub fn complete_month(&self, month: YearMonth) -> LedgerResult<usize> {
        let mut document = self.ledger.load_month(month)?;
        let count = document.complete_all()?;
        if count == 0 {
            return Err(LedgerError::NotFound {
                entity_type: "Unchecked rule line",
                identifier: month.to_string(),
            });
        }
        self.ledger.save_month(month, &document)?;
        Ok(count)
    }

    fn parse_amount(&self, text: &str, currency: Option<&str>) -> LedgerResult<(Money, String)> {
        let currencies = self.ledger.currencies();
        match parse_amount_field(text, currencies) {
            Ok(field) => Ok((field.amount, field.currency)),
            Err(AmountError::MissingCurrency(_)) => {
                let amount =
                    Money::parse(text).map_err(|e| LedgerError::Validation(e.to_string()))?;
                let token = currency.unwrap_or(&self.ledger.settings().base_currency);
                Ok((amount, currencies.resolve(token)?))
            }
            Err(e) => Err(LedgerError::Validation(e.to_string())),
        }
    }
}

fn clean_tokens(tokens: Vec<String>, prefix: char) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens.iter().flat_map(|t| t.split_whitespace()) {
        let token = token.trim_start_matches(prefix).to_string();
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

fn clean_optional(value: Option<String>, prefix: char) -> Option<String> {
    value
        .map(|v| v.trim().trim_start_matches(prefix).to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::config::LedgerPaths;
    use crate::services::sync::sync_rules;
    use crate::storage::init::initialize_ledger;
    use tempfile::TempDir;

    fn test_ledger() -> (TempDir, Ledger) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_dirs(temp_dir.path(), temp_dir.path().join("data"));
        initialize_ledger(&paths, &Settings::default(), 2026, 0).unwrap();
        (temp_dir, Ledger::open(paths).unwrap())
    }

    fn rent() -> NewRule {
        NewRule {
            name: "Rent".into(),
            amount: "-1000".into(),
            day: 1,
            tags: vec!["#home".into()],
            ..NewRule::default()
        }
    }

    #[test]
    fn test_add_rule_defaults() {
        let (_temp_dir, ledger) = test_ledger();
        let service = RuleService::new(&ledger);

        let rule = service.add(rent()).unwrap();
        assert!(rule.id.as_str().starts_with("rent_"));
        assert_eq!(rule.amount, Money::from_units(-1000));
        assert_eq!(rule.currency, "TRY");
        assert_eq!(rule.rule_type, RuleType::Expense);
        assert_eq!(rule.tags, vec!["home"]);
        assert!(rule.active);

        let reloaded = crate::storage::RuleRepository::new(ledger.paths().rules_file());
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
    }

    #[test]
    fn test_add_rule_with_currency_in_amount() {
        let (_temp_dir, ledger) = test_ledger();
        let service = RuleService::new(&ledger);

        let rule = service
            .add(NewRule {
                name: "Salary".into(),
                amount: "5000 $".into(),
                day: 15,
                ..NewRule::default()
            })
            .unwrap();
        assert_eq!(rule.currency, "USD");
        assert_eq!(rule.rule_type, RuleType::Income);
    }

    #[test]
    fn test_add_rule_validation() {
        let (_temp_dir, ledger) = test_ledger();
        let service = RuleService::new(&ledger);

        let mut bad_day = rent();
        bad_day.day = 32;
        assert!(service.add(bad_day).unwrap_err().is_validation());

        let mut bad_currency = rent();
        bad_currency.currency = Some("XYZ".into());
        assert!(service.add(bad_currency).unwrap_err().is_validation());

        let mut no_name = rent();
        no_name.name = "  ".into();
        assert!(service.add(no_name).unwrap_err().is_validation());
    }

    #[test]
    fn test_edit_toggle_remove() {
        let (_temp_dir, ledger) = test_ledger();
        let service = RuleService::new(&ledger);
        let rule = service.add(rent()).unwrap();
        let id = rule.id.to_string();

        let edited = service
            .edit(
                &id,
                RuleEdit {
                    amount: Some("-1200".into()),
                    day: Some(5),
                    ..RuleEdit::default()
                },
            )
            .unwrap();
        assert_eq!(edited.amount, Money::from_units(-1200));
        assert_eq!(edited.currency, "TRY");
        assert_eq!(edited.schedule.day, 5);

        assert!(!service.toggle(&id).unwrap().active);
        assert!(service.toggle(&id).unwrap().active);

        service.remove(&id).unwrap();
        assert!(service.get(&id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_complete_and_uncomplete() {
        let (_temp_dir, ledger) = test_ledger();
        let service = RuleService::new(&ledger);
        let rule = service.add(rent()).unwrap();
        let id = rule.id.to_string();

        let start = YearMonth::new(2026, 11).unwrap();
        sync_rules(&ledger, &ledger.rules.active().unwrap(), start);

        let change = service
            .set_completion(&id, Checkbox::Checked, 2026, None)
            .unwrap();
        assert_eq!(change.month, start);
        assert!(change.line.starts_with("- [x] 01 | Rent"));

        // The next unchecked occurrence is in December
        let change = service
            .set_completion(&id, Checkbox::Checked, 2026, None)
            .unwrap();
        assert_eq!(change.month.month(), 12);

        let change = service
            .set_completion(&id, Checkbox::Unchecked, 2026, Some(start))
            .unwrap();
        assert!(change.line.starts_with("- [ ] 01 | Rent"));
    }

    #[test]
    fn test_complete_by_embedded_id() {
        let (temp_dir, ledger) = test_ledger();
        std::fs::write(
            temp_dir.path().join("2026").join("03.md"),
            "## ROWS\n\n## RULES\n- [ ] 10 | Card [card_7] | -300.00 TRY |\n",
        )
        .unwrap();

        let service = RuleService::new(&ledger);
        let change = service
            .set_completion("card_7", Checkbox::Checked, 2026, None)
            .unwrap();
        assert_eq!(change.month.month(), 3);
        assert_eq!(change.line_number, 4);
    }

    #[test]
    fn test_complete_unknown_rule() {
        let (_temp_dir, ledger) = test_ledger();
        let service = RuleService::new(&ledger);
        let err = service
            .set_completion("ghost", Checkbox::Checked, 2026, None)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_complete_month() {
        let (temp_dir, ledger) = test_ledger();
        std::fs::write(
            temp_dir.path().join("2026").join("05.md"),
            "## ROWS\n\n## RULES\n- [ ] 01 | Rent | -1 TRY |\n- [ ] 02 | Gym | -1 TRY |\n",
        )
        .unwrap();

        let service = RuleService::new(&ledger);
        let may = YearMonth::new(2026, 5).unwrap();
        assert_eq!(service.complete_month(may).unwrap(), 2);
        assert!(service.complete_month(may).unwrap_err().is_not_found());
    }
}
