//! Frequency tables.

use crate::ordinal::OrdinalScale;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{label}: {count}")]
pub struct CategoryCount {
    /// Category label.
    pub label: String,

    /// Number of records (or summed weight) in the category.
    pub count: u64,
}

impl CategoryCount {
    /// Create a new category count.
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Category counts with derived proportions.
///
/// Entries are kept in a defined order (by default descending count, ties by
/// label). The total is always the sum of the entry counts, so proportions
/// sum to 1 whenever the table is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrequencyTable {
    entries: Vec<CategoryCount>,
    total: u64,
}

/// Descending count, then label ascending.
pub(crate) fn by_frequency(a: &CategoryCount, b: &CategoryCount) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label))
}

impl FrequencyTable {
    /// Count occurrences of each value.
    pub fn from_values<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::from_counts(values.into_iter().map(|v| (v, 1)))
    }

    /// Build from (label, count) pairs. Repeated labels are summed.
    ///
    /// Sums saturate at `u64::MAX`. Use [`column_frequencies`] for row data,
    /// which reports the rows that would overflow instead.
    ///
    /// [`column_frequencies`]: crate::aggregate::column_frequencies
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_recode::FrequencyTable;
    ///
    /// let freq = FrequencyTable::from_counts([("B", 40), ("A", 150), ("C", 5)]);
    /// assert_eq!(freq.total(), 195);
    /// assert_eq!(freq.labels(), vec!["A", "B", "C"]);
    /// ```
    pub fn from_counts<S: AsRef<str>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut position: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<CategoryCount> = Vec::new();

        for (label, count) in pairs {
            let label = label.as_ref();
            match position.get(label) {
                Some(&i) => entries[i].count = entries[i].count.saturating_add(count),
                None => {
                    position.insert(label.to_string(), entries.len());
                    entries.push(CategoryCount::new(label, count));
                }
            }
        }

        entries.sort_by(by_frequency);
        Self::from_sorted(entries)
    }

    /// Wrap entries that are already in the desired order.
    pub(crate) fn from_sorted(entries: Vec<CategoryCount>) -> Self {
        let total = entries.iter().fold(0u64, |acc, e| acc.saturating_add(e.count));
        Self { entries, total }
    }

    /// Sum of all counts.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no categories.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in order.
    pub fn entries(&self) -> &[CategoryCount] {
        &self.entries
    }

    /// Labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Whether a label is present.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    /// Count for a label, 0 when absent.
    pub fn count(&self, label: &str) -> u64 {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map_or(0, |e| e.count)
    }

    /// Share of the total for a label; `None` when absent or the table is empty.
    pub fn proportion(&self, label: &str) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count as f64 / self.total as f64)
    }

    /// (label, proportion) for every entry, in order.
    pub fn proportions(&self) -> Vec<(&str, f64)> {
        if self.total == 0 {
            return Vec::new();
        }
        let total = self.total as f64;
        self.entries
            .iter()
            .map(|e| (e.label.as_str(), e.count as f64 / total))
            .collect()
    }

    /// Running share of the total, in entry order.
    ///
    /// Meaningful after [`ordered_by`](Self::ordered_by) for ordinal data,
    /// where it gives P(Y ≤ level).
    pub fn cumulative_proportions(&self) -> Vec<(&str, f64)> {
        let mut running = 0.0;
        self.proportions()
            .into_iter()
            .map(|(label, p)| {
                running += p;
                (label, running)
            })
            .collect()
    }

    /// Reorder entries along an ordinal scale.
    ///
    /// Labels not on the scale follow in their current order.
    pub fn ordered_by(&self, scale: &OrdinalScale) -> Self {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| scale.compare(&a.label, &b.label));
        Self::from_sorted(entries)
    }

    /// Add the zero-count levels of a scale that are absent from the table.
    pub fn with_levels(&self, scale: &OrdinalScale) -> Self {
        let mut entries = self.entries.clone();
        for level in scale.levels() {
            if !self.contains(level) {
                entries.push(CategoryCount::new(level.as_str(), 0));
            }
        }
        Self { entries, total: self.total }.ordered_by(scale)
    }
}
