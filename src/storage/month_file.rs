//! Month-file editor
//!
//! A month file is a heading followed by two sections:
//!
//! ```text
//! # 2026 April
//!
//! ## ROWS
//! - 03 | Market | -120.00 TRY | #food
//!
//! ## RULES
//! - [ ] 01 | Rent | -1000.00 TRY |
//! ```
//!
//! [`MonthDocument`] holds the file as a list of lines and offers the
//! line-level edits every command is built from. A missing section marker is
//! an error; nothing is guessed.

use std::ops::Range;

use crate::config::settings::Locale;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Checkbox, YearMonth};
use crate::parser::split_fields;

pub const ROWS_MARKER: &str = "## ROWS";
pub const RULES_MARKER: &str = "## RULES";
pub const POOL_MARKER: &str = "## POOL";

/// A section of a month file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Plain transactions
    Rows,
    /// Rule projections with checkboxes
    Rules,
    /// Backlog items waiting for a month (`_pool/backlog.md`)
    Pool,
}

impl Section {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Rows => ROWS_MARKER,
            Self::Rules => RULES_MARKER,
            Self::Pool => POOL_MARKER,
        }
    }
}

/// Text of a new, empty month file
pub fn skeleton(month: YearMonth, locale: Locale) -> String {
    format!(
        "# {} {}\n\n{}\n\n{}\n\n",
        month.year(),
        month.month_name(locale),
        ROWS_MARKER,
        RULES_MARKER
    )
}

/// Text of a new, empty backlog file
pub fn pool_skeleton() -> String {
    format!(
        "# Backlog\n# Undated entries, expected receivables, planned purchases\n\n{}\n\n",
        POOL_MARKER
    )
}

/// The checkbox, day and name of a rule line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLine {
    pub checkbox: Checkbox,
    pub day: u32,
    pub name: String,
    /// Remaining `|` fields after day and name
    pub fields: Vec<String>,
}

impl RuleLine {
    /// Recognize `- [ ] DD | Name | ...` / `- [x] DD | Name | ...`
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('-')?.trim_start();
        let checkbox = Checkbox::from_marker(rest.get(..3)?)?;
        let body = rest[3..].trim_start();

        let mut fields = split_fields(body).into_iter();
        let day_field = fields.next()?;
        if day_field.is_empty() || !day_field.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let day = day_field.parse().ok()?;
        let name = fields.next().filter(|n| !n.is_empty())?;

        Some(Self {
            checkbox,
            day,
            name,
            fields: fields.collect(),
        })
    }

    /// Check for an `[id]` token in the name field
    pub fn carries_id(&self, id: &str) -> bool {
        let token = format!("[{}]", id);
        self.name.split_whitespace().any(|word| word == token)
    }
}

/// Replace the checkbox marker of a rule line, keeping everything else
pub fn with_checkbox(line: &str, checkbox: Checkbox) -> Option<String> {
    let indent = line.len() - line.trim_start().len();
    let after_dash = line[indent..].strip_prefix('-')?;
    let gap = after_dash.len() - after_dash.trim_start().len();
    let marker_start = indent + 1 + gap;

    Checkbox::from_marker(line.get(marker_start..marker_start + 3)?)?;

    Some(format!(
        "{}{}{}",
        &line[..marker_start],
        checkbox.marker(),
        &line[marker_start + 3..]
    ))
}

fn is_record(line: &str) -> bool {
    line.trim().starts_with('-')
}

/// A month file as a list of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthDocument {
    /// Name used in error messages (`2026/04.md`)
    label: String,
    lines: Vec<String>,
}

impl MonthDocument {
    /// Split file content into lines
    ///
    /// A trailing newline shows up as a final empty line, so
    /// [`to_text`](Self::to_text) gives the content back byte for byte.
    pub fn parse(label: impl Into<String>, content: &str) -> Self {
        Self {
            label: label.into(),
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Index of a section's marker line
    pub fn marker_index(&self, section: Section) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.trim() == section.marker())
    }

    fn require_marker(&self, section: Section) -> LedgerResult<usize> {
        self.marker_index(section)
            .ok_or_else(|| LedgerError::section_missing(section.marker(), self.label.clone()))
    }

    /// Body of a section: after its marker, up to the next `##` heading or EOF
    pub fn section_range(&self, section: Section) -> LedgerResult<Range<usize>> {
        let marker = self.require_marker(section)?;
        let start = marker + 1;
        let end = self.lines[start..]
            .iter()
            .position(|line| line.trim_start().starts_with("##"))
            .map(|offset| start + offset)
            .unwrap_or(self.lines.len());
        Ok(start..end)
    }

    /// Record lines of a section with their line indexes
    pub fn records(&self, section: Section) -> LedgerResult<Vec<(usize, &str)>> {
        let range = self.section_range(section)?;
        Ok(range
            .filter(|i| is_record(&self.lines[*i]))
            .map(|i| (i, self.lines[i].as_str()))
            .collect())
    }

    /// Insert a formatted line into a section, returning its index
    ///
    /// ROWS and POOL lines go after the last line of the section, ahead of
    /// the blank lines that separate it from the next heading. RULES lines
    /// go directly under the marker.
    pub fn insert_record(&mut self, section: Section, line: impl Into<String>) -> LedgerResult<usize> {
        let range = self.section_range(section)?;

        let index = match section {
            Section::Rules => range.start,
            Section::Rows | Section::Pool => {
                let mut pos = range.end;
                while pos > range.start && self.lines[pos - 1].trim().is_empty() {
                    pos -= 1;
                }
                pos
            }
        };

        self.lines.insert(index, line.into());
        Ok(index)
    }

    /// Insert a line at an exact index
    pub fn insert_at(&mut self, index: usize, line: impl Into<String>) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, line.into());
    }

    /// Line index of the n-th record (1-based) of a section
    pub fn locate_nth_record(&self, section: Section, n: usize) -> LedgerResult<Option<usize>> {
        if n == 0 {
            return Ok(None);
        }
        Ok(self
            .records(section)?
            .get(n - 1)
            .map(|(index, _)| *index))
    }

    /// Replace a line in place
    pub fn replace_line(&mut self, index: usize, line: impl Into<String>) -> LedgerResult<()> {
        let slot = self
            .lines
            .get_mut(index)
            .ok_or_else(|| LedgerError::record_not_found(index + 1))?;
        *slot = line.into();
        Ok(())
    }

    /// Remove a line, returning it
    pub fn remove_line(&mut self, index: usize) -> LedgerResult<String> {
        if index >= self.lines.len() {
            return Err(LedgerError::record_not_found(index + 1));
        }
        Ok(self.lines.remove(index))
    }

    /// Append a section marker at the end when it is missing, returning
    /// the marker index
    pub fn ensure_section(&mut self, section: Section) -> usize {
        if let Some(index) = self.marker_index(section) {
            return index;
        }
        self.lines.push(String::new());
        self.lines.push(section.marker().to_string());
        self.lines.len() - 1
    }

    /// Rule lines of the RULES section with their indexes
    pub fn rule_lines(&self) -> LedgerResult<Vec<(usize, RuleLine)>> {
        let range = self.section_range(Section::Rules)?;
        Ok(range
            .filter_map(|i| RuleLine::parse(&self.lines[i]).map(|rule| (i, rule)))
            .collect())
    }

    /// Set the checkbox of the first rule line accepted by `matches`
    ///
    /// Returns the line index that was changed, or `None` when no line
    /// matched.
    pub fn set_rule_checkbox<F>(&mut self, checkbox: Checkbox, matches: F) -> LedgerResult<Option<usize>>
    where
        F: Fn(&RuleLine) -> bool,
    {
        let target = self
            .rule_lines()?
            .into_iter()
            .find(|(_, rule)| matches(rule))
            .map(|(index, _)| index);

        let Some(index) = target else {
            return Ok(None);
        };

        if let Some(updated) = with_checkbox(&self.lines[index], checkbox) {
            self.lines[index] = updated;
        }
        Ok(Some(index))
    }

    /// Check every unchecked rule line, returning how many changed
    pub fn complete_all(&mut self) -> LedgerResult<usize> {
        let pending: Vec<usize> = self
            .rule_lines()?
            .into_iter()
            .filter(|(_, rule)| !rule.checkbox.is_checked())
            .map(|(index, _)| index)
            .collect();

        for index in &pending {
            if let Some(updated) = with_checkbox(&self.lines[*index], Checkbox::Checked) {
                self.lines[*index] = updated;
            }
        }
        Ok(pending.len())
    }
}
