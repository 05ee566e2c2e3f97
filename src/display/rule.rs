//! Rule display formatting

use crate::models::Rule;

/// Format rules as a table
pub fn format_rule_list(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "No rules found.".to_string();
    }

    let id_width = rules.iter().map(|r| r.id.as_str().len()).max().unwrap_or(2).max(2);
    let name_width = rules.iter().map(|r| r.name.chars().count()).max().unwrap_or(4).max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id_width$}  {:<name_width$}  {:>12}  {:<4}  {:>3}  {:<7}  {}\n",
        "ID",
        "Name",
        "Amount",
        "Cur",
        "Day",
        "Type",
        "Status",
        id_width = id_width,
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<id_width$}  {:-<name_width$}  {:->12}  {:-<4}  {:->3}  {:-<7}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        id_width = id_width,
        name_width = name_width,
    ));

    for rule in rules {
        output.push_str(&format!(
            "{:<id_width$}  {:<name_width$}  {:>12}  {:<4}  {:>3}  {:<7}  {}\n",
            rule.id.as_str(),
            rule.name,
            rule.projected_amount().to_string(),
            rule.currency,
            rule.schedule.day,
            rule.rule_type.to_string(),
            if rule.active { "active" } else { "inactive" },
            id_width = id_width,
            name_width = name_width,
        ));
    }

    let active = rules.iter().filter(|r| r.active).count();
    output.push_str(&format!("\n{} rule(s), {} active\n", rules.len(), active));
    output
}

/// Format rule details
pub fn format_rule_details(rule: &Rule) -> String {
    let mut output = String::new();

    output.push_str(&format!("Rule:      {}\n", rule.name));
    output.push_str(&format!("ID:        {}\n", rule.id));
    output.push_str(&format!(
        "Amount:    {} {}\n",
        rule.projected_amount(),
        rule.currency
    ));
    output.push_str(&format!("Type:      {}\n", rule.rule_type));
    output.push_str(&format!(
        "Schedule:  {} on day {}\n",
        rule.schedule.frequency, rule.schedule.day
    ));
    output.push_str(&format!(
        "Status:    {}\n",
        if rule.active { "active" } else { "inactive" }
    ));

    if !rule.tags.is_empty() {
        output.push_str(&format!("Tags:      {}\n", rule.tags.join(", ")));
    }
    if let Some(project) = &rule.project {
        output.push_str(&format!("Project:   {}\n", project));
    }
    if let Some(category) = &rule.category {
        output.push_str(&format!("Category:  {}\n", category));
    }
    if let Some(start) = rule.start_date {
        output.push_str(&format!("Starts:    {}\n", start));
    }
    if let Some(end) = rule.end_date {
        output.push_str(&format!("Ends:      {}\n", end));
    }
    if let Some(total) = rule.total_amount {
        output.push_str(&format!("Total:     {} {}\n", total, rule.currency));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, RuleId, RuleType};

    fn rent() -> Rule {
        let mut rule = Rule::new(
            RuleId::new("rent_1"),
            "Rent",
            Money::from_units(1000),
            "TRY",
            RuleType::Expense,
            1,
        );
        rule.tags.push("home".into());
        rule
    }

    #[test]
    fn test_format_rule_list() {
        let mut gym = rent();
        gym.id = RuleId::new("gym_1");
        gym.name = "Gym".into();
        gym.active = false;

        let formatted = format_rule_list(&[rent(), gym]);
        assert!(formatted.contains("rent_1"));
        assert!(formatted.contains("-1000.00"));
        assert!(formatted.contains("inactive"));
        assert!(formatted.contains("2 rule(s), 1 active"));
    }

    #[test]
    fn test_format_empty_list() {
        assert_eq!(format_rule_list(&[]), "No rules found.");
    }

    #[test]
    fn test_format_rule_details() {
        let formatted = format_rule_details(&rent());
        assert!(formatted.contains("ID:        rent_1"));
        assert!(formatted.contains("Amount:    -1000.00 TRY"));
        assert!(formatted.contains("Tags:      home"));
    }
}
