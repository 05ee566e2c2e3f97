//! Rule repository for YAML storage
//!
//! Manages loading and saving rules to `_config/rules.yml`

use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Rule, RuleId};

use super::file_io::{read_yaml, write_yaml_atomic};

/// Comment block written above the rule list
pub const RULES_HEADER: &str =
    "# SpendGrid Rules\n# Recurring income and expenses projected into month files by sync\n";

/// Serializable rule file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Repository for rule persistence
pub struct RuleRepository {
    path: PathBuf,
    data: RwLock<Vec<Rule>>,
}

fn lock_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Io(format!("Failed to acquire rules lock: {}", e))
}

impl RuleRepository {
    /// Create a new rule repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load rules from disk (an absent file is an empty rule set)
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: RuleSet = read_yaml(&self.path)?;
        let mut data = self.data.write().map_err(lock_error)?;
        *data = file_data.rules;
        Ok(())
    }

    /// Save rules to disk, in their current order
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(lock_error)?;
        let file_data = RuleSet {
            rules: data.clone(),
        };
        write_yaml_atomic(&self.path, Some(RULES_HEADER), &file_data)
    }

    /// Get a rule by ID
    pub fn get(&self, id: &str) -> LedgerResult<Option<Rule>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.iter().find(|r| r.id.as_str() == id).cloned())
    }

    /// Get all rules in file order
    pub fn get_all(&self) -> LedgerResult<Vec<Rule>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.clone())
    }

    /// Get active rules in file order
    pub fn active(&self) -> LedgerResult<Vec<Rule>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.iter().filter(|r| r.active).cloned().collect())
    }

    /// All ids currently in use
    pub fn ids(&self) -> LedgerResult<Vec<RuleId>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.iter().map(|r| r.id.clone()).collect())
    }

    /// Add a rule; its id must be unused
    pub fn add(&self, rule: Rule) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;
        if data.iter().any(|r| r.id == rule.id) {
            return Err(LedgerError::Duplicate {
                entity_type: "Rule",
                identifier: rule.id.to_string(),
            });
        }
        data.push(rule);
        Ok(())
    }

    /// Replace the rule with the given id
    pub fn update(&self, id: &str, rule: Rule) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;
        let slot = data
            .iter_mut()
            .find(|r| r.id.as_str() == id)
            .ok_or_else(|| LedgerError::rule_not_found(id))?;
        *slot = rule;
        Ok(())
    }

    /// Delete a rule, returning it
    pub fn delete(&self, id: &str) -> LedgerResult<Rule> {
        let mut data = self.data.write().map_err(lock_error)?;
        let index = data
            .iter()
            .position(|r| r.id.as_str() == id)
            .ok_or_else(|| LedgerError::rule_not_found(id))?;
        Ok(data.remove(index))
    }

    /// Flip a rule's active flag, returning the new state
    pub fn toggle(&self, id: &str) -> LedgerResult<bool> {
        let mut data = self.data.write().map_err(lock_error)?;
        let rule = data
            .iter_mut()
            .find(|r| r.id.as_str() == id)
            .ok_or_else(|| LedgerError::rule_not_found(id))?;
        rule.active = !rule.active;
        Ok(rule.active)
    }

    /// Number of rules
    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, RuleType};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, RuleRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("_config").join("rules.yml");
        let repo = RuleRepository::new(path);
        (temp_dir, repo)
    }

    fn rule(id: &str, name: &str) -> Rule {
        Rule::new(
            RuleId::new(id),
            name,
            Money::from_units(-100),
            "TRY",
            RuleType::Expense,
            1,
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_add_save_load() {
        let (temp_dir, repo) = create_test_repo();
        repo.add(rule("rent_1", "Rent")).unwrap();
        repo.add(rule("gym_1", "Gym")).unwrap();
        repo.save().unwrap();

        let contents =
            std::fs::read_to_string(temp_dir.path().join("_config").join("rules.yml")).unwrap();
        assert!(contents.starts_with("# SpendGrid Rules\n"));

        let repo2 = RuleRepository::new(temp_dir.path().join("_config").join("rules.yml"));
        repo2.load().unwrap();
        let all = repo2.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Rent");
        assert_eq!(all[1].name, "Gym");
    }

    #[test]
    fn test_duplicate_id() {
        let (_temp_dir, repo) = create_test_repo();
        repo.add(rule("rent_1", "Rent")).unwrap();
        let err = repo.add(rule("rent_1", "Rent again")).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
    }

    #[test]
    fn test_toggle_and_active() {
        let (_temp_dir, repo) = create_test_repo();
        repo.add(rule("rent_1", "Rent")).unwrap();
        repo.add(rule("gym_1", "Gym")).unwrap();

        assert!(!repo.toggle("gym_1").unwrap());
        let active = repo.active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id.as_str(), "rent_1");

        assert!(repo.toggle("gym_1").unwrap());
        assert!(repo.toggle("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_and_delete() {
        let (_temp_dir, repo) = create_test_repo();
        repo.add(rule("rent_1", "Rent")).unwrap();

        let mut updated = rule("rent_1", "Rent");
        updated.amount = Money::from_units(-1500);
        repo.update("rent_1", updated).unwrap();
        assert_eq!(
            repo.get("rent_1").unwrap().unwrap().amount,
            Money::from_units(-1500)
        );

        let deleted = repo.delete("rent_1").unwrap();
        assert_eq!(deleted.name, "Rent");
        assert!(repo.get("rent_1").unwrap().is_none());
        assert!(repo.delete("rent_1").unwrap_err().is_not_found());
        assert!(repo.update("rent_1", rule("rent_1", "x")).unwrap_err().is_not_found());
    }
}
