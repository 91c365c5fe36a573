//! Rare-category lumping.
//!
//! Lumped categories lose their identity and are merged into a single
//! catch-all category. The total count is preserved and lumping is
//! idempotent for every rule.

use crate::category_map::OTHER;
use crate::error::{RecodeError, Result};
use crate::frequency::{CategoryCount, FrequencyTable, by_frequency};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_data::Table;

/// Which categories keep their identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LumpRule {
    /// Keep categories with at least this many records.
    MinCount(u64),

    /// Keep the `n` most frequent categories (ties by label).
    TopN(usize),

    /// Keep categories whose share of the total is at least this fraction.
    MinProportion(f64),
}

impl LumpRule {
    /// Check parameters. `MinProportion` must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::MinProportion(p) if !(0.0..=1.0).contains(&p) => Err(
                RecodeError::InvalidLumpRule(format!("proportion {p} is outside [0, 1]")),
            ),
            _ => Ok(()),
        }
    }

    fn keeps(&self, rank: usize, count: u64, total: u64) -> bool {
        match *self {
            Self::MinCount(min) => count >= min,
            Self::TopN(n) => rank < n,
            Self::MinProportion(p) => total > 0 && count as f64 / total as f64 >= p,
        }
    }
}

/// Lump into `"Other"`.
///
/// # Examples
///
/// ```
/// use tally_recode::{FrequencyTable, LumpRule, lump};
///
/// let freq = FrequencyTable::from_counts([("A", 150), ("B", 40), ("C", 5)]);
/// let lumped = lump(&freq, LumpRule::MinCount(50));
///
/// assert_eq!(lumped.labels(), vec!["A", "Other"]);
/// assert_eq!(lumped.count("Other"), 45);
/// assert_eq!(lumped.total(), freq.total());
/// ```
pub fn lump(table: &FrequencyTable, rule: LumpRule) -> FrequencyTable {
    lump_into(table, rule, OTHER)
}

/// Lump into a custom catch-all label.
///
/// Remaining categories are ordered by descending count (ties by label)
/// with the catch-all last. An existing catch-all entry is never lumped
/// away; lumped counts are added to it.
pub fn lump_into(table: &FrequencyTable, rule: LumpRule, other: &str) -> FrequencyTable {
    let mut candidates: Vec<&CategoryCount> =
        table.entries().iter().filter(|e| e.label != other).collect();
    candidates.sort_by(|a, b| by_frequency(a, b));

    let mut other_count = table.count(other);
    let mut entries = Vec::with_capacity(candidates.len() + 1);
    for (rank, entry) in candidates.into_iter().enumerate() {
        if rule.keeps(rank, entry.count, table.total()) {
            entries.push(entry.clone());
        } else {
            other_count = other_count.saturating_add(entry.count);
        }
    }

    let lumped = table.len() - entries.len() - usize::from(table.contains(other));
    if other_count > 0 || table.contains(other) {
        entries.push(CategoryCount::new(other, other_count));
    }

    tracing::debug!(?rule, lumped, kept = entries.len(), "lumped categories");
    FrequencyTable::from_sorted(entries)
}

/// Rewrite rare values of a categorical column to `"Other"`.
///
/// Rarity is judged on the column's own frequencies. Missing cells stay
/// missing.
pub fn lump_column(table: &Table, column: &str, rule: LumpRule) -> Result<Table> {
    lump_column_into(table, column, rule, OTHER)
}

/// Rewrite rare values of a categorical column to a custom catch-all label.
pub fn lump_column_into(table: &Table, column: &str, rule: LumpRule, other: &str) -> Result<Table> {
    let values: Vec<Option<&str>> = table.column_values(column)?.collect();
    let freq = FrequencyTable::from_values(values.iter().flatten());
    let lumped = lump_into(&freq, rule, other);
    let kept: HashSet<&str> = lumped
        .labels()
        .into_iter()
        .filter(|label| *label != other)
        .collect();

    let rewritten = values
        .into_iter()
        .map(|value| {
            value.map(|v| {
                if kept.contains(v) {
                    v.to_string()
                } else {
                    other.to_string()
                }
            })
        })
        .collect();

    Ok(table.with_column(column, rewritten)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn abc() -> FrequencyTable {
        FrequencyTable::from_counts([("A", 150), ("B", 40), ("C", 5)])
    }

    #[test]
    fn test_min_count_example() {
        let lumped = lump(&abc(), LumpRule::MinCount(50));
        assert_eq!(lumped.labels(), vec!["A", "Other"]);
        assert_eq!(lumped.count("A"), 150);
        assert_eq!(lumped.count("Other"), 45);
    }

    #[test]
    fn test_nothing_to_lump() {
        let lumped = lump(&abc(), LumpRule::MinCount(1));
        assert_eq!(lumped, abc());
    }

    #[test]
    fn test_existing_other_absorbs_and_goes_last() {
        let freq = FrequencyTable::from_counts([("Other", 500), ("A", 150), ("B", 40)]);
        let lumped = lump(&freq, LumpRule::MinCount(50));
        assert_eq!(lumped.labels(), vec!["A", "Other"]);
        assert_eq!(lumped.count("Other"), 540);
    }

    #[rstest]
    #[case(LumpRule::MinCount(50))]
    #[case(LumpRule::MinCount(0))]
    #[case(LumpRule::MinCount(1000))]
    #[case(LumpRule::TopN(1))]
    #[case(LumpRule::TopN(0))]
    #[case(LumpRule::MinProportion(0.1))]
    #[case(LumpRule::MinProportion(1.0))]
    fn test_idempotent_and_total_preserving(#[case] rule: LumpRule) {
        let once = lump(&abc(), rule);
        let twice = lump(&once, rule);
        assert_eq!(once, twice);
        assert_eq!(once.total(), abc().total());
    }

    #[test]
    fn test_top_n_ties_by_label() {
        let freq = FrequencyTable::from_counts([("b", 10), ("a", 10), ("c", 10), ("d", 1)]);
        let lumped = lump(&freq, LumpRule::TopN(2));
        assert_eq!(lumped.labels(), vec!["a", "b", "Other"]);
        assert_eq!(lumped.count("Other"), 11);
    }

    #[test]
    fn test_min_proportion() {
        let lumped = lump(&abc(), LumpRule::MinProportion(0.2));
        assert_eq!(lumped.labels(), vec!["A", "B", "Other"]);
        assert_eq!(lumped.count("Other"), 5);
    }

    #[test]
    fn test_custom_other_label() {
        let lumped = lump_into(&abc(), LumpRule::TopN(1), "Everything else");
        assert_eq!(lumped.labels(), vec!["A", "Everything else"]);
    }

    #[test]
    fn test_empty_table() {
        let empty = FrequencyTable::default();
        let lumped = lump(&empty, LumpRule::MinCount(5));
        assert!(lumped.is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(LumpRule::MinProportion(0.05).validate().is_ok());
        assert!(LumpRule::MinProportion(1.5).validate().is_err());
        assert!(LumpRule::MinProportion(f64::NAN).validate().is_err());
        assert!(LumpRule::TopN(0).validate().is_ok());
    }

    #[test]
    fn test_lump_column() {
        let table = Table::from_rows(
            ["currency"],
            [["USD"], ["USD"], ["USD"], ["CAD"], ["CAD"], ["JPY"], [""]],
        )
        .unwrap();

        let lumped = lump_column(&table, "currency", LumpRule::MinCount(2)).unwrap();
        let values: Vec<Option<&str>> = lumped.column_values("currency").unwrap().collect();
        assert_eq!(
            values,
            vec![
                Some("USD"),
                Some("USD"),
                Some("USD"),
                Some("CAD"),
                Some("CAD"),
                Some("Other"),
                None
            ]
        );
    }
}
