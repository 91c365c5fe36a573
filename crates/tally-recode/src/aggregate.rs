//! Grouped aggregation.
//!
//! Counts records per combination of categorical keys and turns the counts
//! into proportions within a caller-chosen partition: per overall total, or
//! per value of a subset of the keys (e.g. per year and sex).

use crate::error::{RecodeError, Result};
use crate::frequency::FrequencyTable;
use crate::ordinal::OrdinalScale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tally_data::{Diagnostics, IssueKind, RowIssue, Table};

/// Scope that proportions are normalized within.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Relative to the grand total.
    #[default]
    Overall,

    /// Relative to each combination of these keys.
    Within(Vec<String>),
}

impl Partition {
    /// Partition by the given keys.
    pub fn within<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self::Within(keys.into_iter().map(Into::into).collect())
    }

    /// Partition keys (empty for `Overall`).
    pub fn keys(&self) -> &[String] {
        match self {
            Self::Overall => &[],
            Self::Within(keys) => keys,
        }
    }
}

/// One group of a [`GroupedSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    /// Key values, in grouping-key order.
    pub key: Vec<String>,

    /// Records (or summed weight) in the group.
    pub count: u64,

    /// Share of the enclosing partition cell.
    pub proportion: f64,

    /// Running share within the partition cell, when an ordinal scale was set.
    pub cumulative: Option<f64>,
}

/// Counts and proportions per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedSummary {
    keys: Vec<String>,
    partition: Partition,
    weight: Option<String>,
    rows: Vec<GroupRow>,
}

impl GroupedSummary {
    /// Grouping keys.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Partition the proportions are relative to.
    pub const fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Weight column, if counts are weighted.
    pub fn weight(&self) -> Option<&str> {
        self.weight.as_deref()
    }

    /// Rows in key order.
    pub fn rows(&self) -> &[GroupRow] {
        &self.rows
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all group counts.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Row with exactly these key values.
    pub fn get(&self, key: &[&str]) -> Option<&GroupRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Partition cell of a row (values of the partition keys).
    pub fn cell_of(&self, row: &GroupRow) -> Vec<String> {
        self.partition
            .keys()
            .iter()
            .filter_map(|k| self.keys.iter().position(|g| g == k))
            .map(|i| row.key[i].clone())
            .collect()
    }

    /// Total count per partition cell.
    pub fn cell_totals(&self) -> BTreeMap<Vec<String>, u64> {
        let mut totals = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(self.cell_of(row)).or_insert(0) += row.count;
        }
        totals
    }

    /// Sum of proportions per partition cell (1 for every non-empty cell).
    pub fn proportion_sums(&self) -> BTreeMap<Vec<String>, f64> {
        let mut sums = BTreeMap::new();
        for row in &self.rows {
            *sums.entry(self.cell_of(row)).or_insert(0.0) += row.proportion;
        }
        sums
    }
}

/// Builder for a grouped aggregation.
///
/// # Examples
///
/// ```
/// use tally_data::Table;
/// use tally_recode::GroupBy;
///
/// let names = Table::from_rows(
///     ["year", "sex", "name", "n"],
///     [
///         ["1990", "F", "Jessica", "46466"],
///         ["1990", "F", "Ashley", "45549"],
///         ["1990", "M", "Michael", "65282"],
///     ],
/// )
/// .unwrap();
///
/// let (summary, issues) = GroupBy::new(["year", "sex", "name"])
///     .within(["year", "sex"])
///     .weighted("n")
///     .run(&names)
///     .unwrap();
///
/// assert!(issues.is_empty());
/// assert_eq!(summary.get(&["1990", "M", "Michael"]).unwrap().proportion, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct GroupBy {
    keys: Vec<String>,
    partition: Partition,
    weight: Option<String>,
    ordinal: Option<OrdinalScale>,
}

impl GroupBy {
    /// Group by these keys, proportions relative to the grand total.
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            partition: Partition::Overall,
            weight: None,
            ordinal: None,
        }
    }

    /// Normalize proportions within each combination of these keys.
    pub fn within<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.partition = Partition::within(keys);
        self
    }

    /// Set the partition directly.
    pub fn partition(mut self, partition: Partition) -> Self {
        self.partition = partition;
        self
    }

    /// Sum a count column instead of counting records.
    pub fn weighted(mut self, column: impl Into<String>) -> Self {
        self.weight = Some(column.into());
        self
    }

    /// Treat the last grouping key as ordinal: order its values along the
    /// scale and report cumulative proportions.
    pub fn ordinal(mut self, scale: OrdinalScale) -> Self {
        self.ordinal = Some(scale);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(RecodeError::NoGroupKeys);
        }
        for (i, key) in self.keys.iter().enumerate() {
            if self.keys[..i].contains(key) {
                return Err(RecodeError::DuplicateKey(key.clone()));
            }
        }
        for key in self.partition.keys() {
            if !self.keys.contains(key) {
                return Err(RecodeError::InvalidPartition(key.clone()));
            }
        }
        Ok(())
    }

    /// Run the aggregation.
    ///
    /// Rows with a missing key or an unusable weight are skipped and
    /// reported. Groups with zero total weight are left out.
    pub fn run(&self, table: &Table) -> Result<(GroupedSummary, Diagnostics)> {
        self.validate()?;

        let key_index = self
            .keys
            .iter()
            .map(|k| table.column_index(k))
            .collect::<tally_data::Result<Vec<_>>>()?;
        if let Some(weight) = &self.weight {
            table.column_index(weight)?;
        }

        let mut diagnostics = Diagnostics::new();
        let mut counts: HashMap<Vec<String>, u64> = HashMap::new();
        let mut total = 0u64;

        'rows: for row in table.rows() {
            let mut key = Vec::with_capacity(key_index.len());
            for (name, &i) in self.keys.iter().zip(&key_index) {
                match row.record().value(i) {
                    Some(value) => key.push(value.to_string()),
                    None => {
                        diagnostics.push(RowIssue::new(
                            row.line(),
                            name.as_str(),
                            IssueKind::Missing,
                        ));
                        continue 'rows;
                    }
                }
            }

            let weight = match &self.weight {
                Some(column) => match row.count(column) {
                    Ok(w) => w,
                    Err(kind) => {
                        diagnostics.push(RowIssue::new(row.line(), column.as_str(), kind));
                        continue;
                    }
                },
                None => 1,
            };

            // Every group and cell count is bounded by the grand total.
            let Some(next) = total.checked_add(weight) else {
                let column = self.weight.as_deref().unwrap_or(self.keys[0].as_str());
                diagnostics.push(RowIssue::new(row.line(), column, IssueKind::CountOverflow(weight)));
                continue;
            };
            total = next;
            *counts.entry(key).or_insert(0) += weight;
        }

        let mut groups: Vec<(Vec<String>, u64)> =
            counts.into_iter().filter(|(_, count)| *count > 0).collect();
        groups.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));

        let cell_positions: Vec<usize> = self
            .partition
            .keys()
            .iter()
            .filter_map(|k| self.keys.iter().position(|g| g == k))
            .collect();
        let cell = |key: &[String]| -> Vec<String> {
            cell_positions.iter().map(|&i| key[i].clone()).collect()
        };

        let mut cell_totals: HashMap<Vec<String>, u64> = HashMap::new();
        for (key, count) in &groups {
            *cell_totals.entry(cell(key)).or_insert(0) += count;
        }

        let mut running: HashMap<Vec<String>, u64> = HashMap::new();
        let rows = groups
            .into_iter()
            .map(|(key, count)| {
                let cell_key = cell(&key);
                let total = cell_totals[&cell_key] as f64;
                let cumulative = self.ordinal.as_ref().map(|_| {
                    let acc = running.entry(cell_key).or_insert(0);
                    *acc += count;
                    *acc as f64 / total
                });
                GroupRow {
                    key,
                    count,
                    proportion: count as f64 / total,
                    cumulative,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            keys = ?self.keys,
            groups = rows.len(),
            cells = cell_totals.len(),
            skipped = diagnostics.flagged_lines().len(),
            "aggregated"
        );

        Ok((
            GroupedSummary {
                keys: self.keys.clone(),
                partition: self.partition.clone(),
                weight: self.weight.clone(),
                rows,
            },
            diagnostics,
        ))
    }

    fn compare_keys(&self, a: &[String], b: &[String]) -> Ordering {
        let last = self.keys.len() - 1;
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            let ordering = match &self.ordinal {
                Some(scale) if i == last => scale
                    .compare(x, y)
                    .then_with(|| natural_compare(x, y)),
                _ => natural_compare(x, y),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Numbers compare numerically, everything else lexicographically;
/// numbers sort before text.
pub(crate) fn natural_compare(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Frequency table of one categorical column.
///
/// Missing cells are left out. With a weight column its values are summed
/// instead of counting rows; rows with an unusable weight are skipped and
/// reported.
pub fn column_frequencies(
    table: &Table,
    column: &str,
    weight: Option<&str>,
) -> Result<(FrequencyTable, Diagnostics)> {
    let mut diagnostics = Diagnostics::new();
    let Some(weight) = weight else {
        let freq = FrequencyTable::from_values(table.column_values(column)?.flatten());
        return Ok((freq, diagnostics));
    };

    table.column_index(column)?;
    table.column_index(weight)?;
    let mut pairs = Vec::with_capacity(table.len());
    let mut total = 0u64;
    for row in table.rows() {
        let Some(label) = row.get(column) else {
            continue;
        };
        let w = match row.count(weight) {
            Ok(w) => w,
            Err(kind) => {
                diagnostics.push(RowIssue::new(row.line(), weight, kind));
                continue;
            }
        };
        match total.checked_add(w) {
            Some(next) => {
                total = next;
                pairs.push((label, w));
            }
            None => diagnostics.push(RowIssue::new(row.line(), weight, IssueKind::CountOverflow(w))),
        }
    }
    Ok((FrequencyTable::from_counts(pairs), diagnostics))
}
