//! Terminal and Markdown rendering of summaries.
//!
//! Proportions are shown as percentages with one decimal.

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_data::Diagnostics;
use tally_recode::{FrequencyTable, GroupedSummary, Partition};

const RULE_WIDTH: usize = 72;

/// Row issues listed individually before the rest are elided.
const MAX_LISTED_ISSUES: usize = 20;

/// Renders a value for humans.
pub trait Render {
    /// Plain-text table for terminal display.
    fn to_ascii_table(&self) -> String;

    /// Markdown for notes and write-ups.
    fn to_markdown(&self) -> String;
}

fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

fn rule(c: char) -> String {
    format!("{}\n", c.to_string().repeat(RULE_WIDTH))
}

/// A titled frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencySummary {
    /// Heading, usually the column or question.
    pub title: String,

    /// Counts in display order.
    pub table: FrequencyTable,

    /// Whether to show cumulative percentages (ordinal data).
    pub cumulative: bool,
}

impl FrequencySummary {
    /// Create a new summary.
    pub fn new(title: impl Into<String>, table: FrequencyTable) -> Self {
        Self {
            title: title.into(),
            table,
            cumulative: false,
        }
    }

    /// Show a cumulative percentage column.
    pub const fn with_cumulative(mut self) -> Self {
        self.cumulative = true;
        self
    }

    /// (label, count, proportion, cumulative) per entry.
    fn lines(&self) -> Vec<(&str, u64, f64, f64)> {
        let total = self.table.total();
        let mut running = 0.0;
        self.table
            .entries()
            .iter()
            .map(|e| {
                let p = if total > 0 {
                    e.count as f64 / total as f64
                } else {
                    0.0
                };
                running += p;
                (e.label.as_str(), e.count, p, running)
            })
            .collect()
    }
}

impl Render for FrequencySummary {
    fn to_ascii_table(&self) -> String {
        let width = self
            .table
            .labels()
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max("Category".len());

        let mut output = String::new();
        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&rule('='));
        output.push_str(&format!("{:<width$} {:>10} {:>9}", "Category", "Count", "Percent"));
        if self.cumulative {
            output.push_str(&format!(" {:>11}", "Cumulative"));
        }
        output.push('\n');
        output.push_str(&rule('-'));

        for (label, count, p, cum) in self.lines() {
            output.push_str(&format!("{label:<width$} {count:>10} {:>9}", percent(p)));
            if self.cumulative {
                output.push_str(&format!(" {:>11}", percent(cum)));
            }
            output.push('\n');
        }

        output.push_str(&rule('-'));
        let all = if self.table.is_empty() { 0.0 } else { 1.0 };
        output.push_str(&format!(
            "{:<width$} {:>10} {:>9}\n",
            "Total",
            self.table.total(),
            percent(all)
        ));
        output.push_str(&rule('='));
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("## {}\n\n", self.title));

        if self.cumulative {
            output.push_str("| Category | Count | Percent | Cumulative |\n");
            output.push_str("|----------|------:|--------:|-----------:|\n");
        } else {
            output.push_str("| Category | Count | Percent |\n");
            output.push_str("|----------|------:|--------:|\n");
        }

        for (label, count, p, cum) in self.lines() {
            if self.cumulative {
                output.push_str(&format!(
                    "| {label} | {count} | {} | {} |\n",
                    percent(p),
                    percent(cum)
                ));
            } else {
                output.push_str(&format!("| {label} | {count} | {} |\n", percent(p)));
            }
        }

        output.push_str(&format!("\n**Total:** {}\n", self.table.total()));
        output
    }
}

impl fmt::Display for FrequencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (n = {})", self.title, self.table.total())?;
        for (label, count, p, _) in self.lines() {
            writeln!(f, "  {label}: {count} ({})", percent(p))?;
        }
        Ok(())
    }
}

fn grouped_title(summary: &GroupedSummary) -> String {
    let mut title = format!("Grouped by {}", summary.keys().join(", "));
    if let Partition::Within(cell) = summary.partition() {
        title.push_str(&format!(" (within {})", cell.join(", ")));
    }
    if let Some(weight) = summary.weight() {
        title.push_str(&format!(", weighted by {weight}"));
    }
    title
}

impl Render for GroupedSummary {
    fn to_ascii_table(&self) -> String {
        let has_cumulative = self.rows().iter().any(|r| r.cumulative.is_some());
        let widths: Vec<usize> = self
            .keys()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                self.rows()
                    .iter()
                    .map(|r| r.key[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        output.push_str(&format!("\n{}\n", grouped_title(self)));
        output.push_str(&rule('='));
        for (name, width) in self.keys().iter().zip(&widths) {
            output.push_str(&format!("{name:<width$} "));
        }
        output.push_str(&format!("{:>10} {:>9}", "Count", "Percent"));
        if has_cumulative {
            output.push_str(&format!(" {:>11}", "Cumulative"));
        }
        output.push('\n');
        output.push_str(&rule('-'));

        for row in self.rows() {
            for (value, width) in row.key.iter().zip(&widths) {
                output.push_str(&format!("{value:<width$} "));
            }
            output.push_str(&format!("{:>10} {:>9}", row.count, percent(row.proportion)));
            if let Some(cum) = row.cumulative {
                output.push_str(&format!(" {:>11}", percent(cum)));
            }
            output.push('\n');
        }

        output.push_str(&rule('='));
        output.push_str(&format!(
            "{} groups, total {}\n",
            self.len(),
            self.total()
        ));
        output
    }

    fn to_markdown(&self) -> String {
        let has_cumulative = self.rows().iter().any(|r| r.cumulative.is_some());
        let mut output = String::new();
        output.push_str(&format!("## {}\n\n", grouped_title(self)));

        let mut header = String::from("|");
        let mut align = String::from("|");
        for name in self.keys() {
            header.push_str(&format!(" {name} |"));
            align.push_str("---|");
        }
        header.push_str(" Count | Percent |");
        align.push_str("---:|---:|");
        if has_cumulative {
            header.push_str(" Cumulative |");
            align.push_str("---:|");
        }
        output.push_str(&header);
        output.push('\n');
        output.push_str(&align);
        output.push('\n');

        for row in self.rows() {
            output.push('|');
            for value in &row.key {
                output.push_str(&format!(" {value} |"));
            }
            output.push_str(&format!(" {} | {} |", row.count, percent(row.proportion)));
            if has_cumulative {
                let cum = row.cumulative.map(percent).unwrap_or_default();
                output.push_str(&format!(" {cum} |"));
            }
            output.push('\n');
        }
        output
    }
}

impl Render for Diagnostics {
    fn to_ascii_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\nRow issues: {} ({} rows)\n",
            self.len(),
            self.flagged_lines().len()
        ));
        if self.is_empty() {
            return output;
        }
        output.push_str(&rule('-'));
        for (column, count) in self.counts_by_column() {
            output.push_str(&format!("  {column:<30} {count:>8}\n"));
        }
        output.push_str(&rule('-'));
        for issue in self.issues().iter().take(MAX_LISTED_ISSUES) {
            output.push_str(&format!("  {issue}\n"));
        }
        if self.len() > MAX_LISTED_ISSUES {
            output.push_str(&format!("  ... and {} more\n", self.len() - MAX_LISTED_ISSUES));
        }
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("## Row issues\n\n");
        if self.is_empty() {
            output.push_str("None.\n");
            return output;
        }

        output.push_str(&format!(
            "{} issues on {} rows.\n\n",
            self.len(),
            self.flagged_lines().len()
        ));
        output.push_str("| Column | Issues |\n");
        output.push_str("|--------|-------:|\n");
        for (column, count) in self.counts_by_column() {
            output.push_str(&format!("| {column} | {count} |\n"));
        }
        output.push('\n');
        for issue in self.issues().iter().take(MAX_LISTED_ISSUES) {
            output.push_str(&format!("- {issue}\n"));
        }
        if self.len() > MAX_LISTED_ISSUES {
            output.push_str(&format!("- ... and {} more\n", self.len() - MAX_LISTED_ISSUES));
        }
        output
    }
}
