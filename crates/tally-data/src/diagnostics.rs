//! Row-level diagnostics.
//!
//! Bad cells never abort a run. They are collected here, traced as they are
//! found, warned about once when merged into a run's diagnostics, and carried
//! to the report so they can be inspected by hand.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What is wrong with a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IssueKind {
    /// The cell is empty or holds a missing-value marker.
    Missing,

    /// The cell should be numeric but is not.
    NotNumeric(String),

    /// The cell should be non-negative.
    Negative(f64),

    /// The cell should be a whole number.
    NotInteger(String),

    /// Adding this weight would push the running total past `u64::MAX`.
    CountOverflow(u64),
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing value"),
            Self::NotNumeric(raw) => write!(f, "not numeric: {raw:?}"),
            Self::Negative(value) => write!(f, "negative value: {value}"),
            Self::NotInteger(raw) => write!(f, "not a whole number: {raw:?}"),
            Self::CountOverflow(weight) => write!(f, "weight {weight} overflows the total count"),
        }
    }
}

/// A problem found in one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    /// 1-based data row number in the source.
    pub line: usize,

    /// Column the cell belongs to.
    pub column: String,

    /// What is wrong.
    pub kind: IssueKind,
}

impl RowIssue {
    /// Create a new row issue.
    pub fn new(line: usize, column: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            line,
            column: column.into(),
            kind,
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} [{}]: {}", self.line, self.column, self.kind)
    }
}

/// What to do with a row that has a flagged cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyPolicy {
    /// Keep the row and record the issue.
    #[default]
    Flag,

    /// Remove the row and record the issue.
    Drop,
}

/// Collected row issues for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    issues: Vec<RowIssue>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue where it is found.
    pub fn push(&mut self, issue: RowIssue) {
        tracing::debug!(
            line = issue.line,
            column = %issue.column,
            "{}",
            issue.kind
        );
        self.issues.push(issue);
    }

    /// Merge another collection into this one, warning once per new issue.
    ///
    /// An issue for a cell that already has one is skipped, so stages that
    /// look at the same column report (and log) a row only once.
    pub fn extend(&mut self, other: Self) {
        let mut seen: BTreeSet<(usize, String)> = self
            .issues
            .iter()
            .map(|i| (i.line, i.column.clone()))
            .collect();
        for issue in other.issues {
            if seen.insert((issue.line, issue.column.clone())) {
                tracing::warn!(
                    line = issue.line,
                    column = %issue.column,
                    "{}",
                    issue.kind
                );
                self.issues.push(issue);
            }
        }
    }

    /// All issues in the order they were found.
    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether no issue was recorded.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Distinct row numbers with at least one issue.
    pub fn flagged_lines(&self) -> BTreeSet<usize> {
        self.issues.iter().map(|i| i.line).collect()
    }

    /// Issue count per column.
    pub fn counts_by_column(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.column.clone()).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "No row issues.");
        }
        writeln!(
            f,
            "{} issue(s) in {} row(s):",
            self.len(),
            self.flagged_lines().len()
        )?;
        for issue in &self.issues {
            writeln!(f, "  {issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_counts() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(RowIssue::new(3, "salary", IssueKind::Missing));
        diagnostics.push(RowIssue::new(
            3,
            "currency",
            IssueKind::NotNumeric("??".to_string()),
        ));
        diagnostics.push(RowIssue::new(7, "salary", IssueKind::Negative(-1.0)));

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.flagged_lines().len(), 2);

        let by_column = diagnostics.counts_by_column();
        assert_eq!(by_column.get("salary"), Some(&2));
        assert_eq!(by_column.get("currency"), Some(&1));
    }

    #[test]
    fn test_diagnostics_display() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.to_string().contains("No row issues"));

        diagnostics.push(RowIssue::new(
            12,
            "salary",
            IssueKind::NotNumeric("55k".to_string()),
        ));
        let text = diagnostics.to_string();
        assert!(text.contains("row 12 [salary]"));
        assert!(text.contains("\"55k\""));
    }

    #[test]
    fn test_extend_skips_cells_already_reported() {
        let mut first = Diagnostics::new();
        first.push(RowIssue::new(2, "currency", IssueKind::Missing));

        let mut second = Diagnostics::new();
        second.push(RowIssue::new(2, "currency", IssueKind::Missing));
        second.push(RowIssue::new(2, "salary", IssueKind::Missing));
        second.push(RowIssue::new(5, "currency", IssueKind::Missing));

        first.extend(second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_policy_default_is_flag() {
        assert_eq!(AnomalyPolicy::default(), AnomalyPolicy::Flag);
    }
}
