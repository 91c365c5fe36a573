//! Polars adapters.
//!
//! Summaries as `DataFrame`s for dataframe-based plotting and modelling
//! tools, plus a lazy grouped aggregation that works directly on a frame.

use crate::aggregate::{GroupedSummary, Partition, natural_compare};
use crate::error::{RecodeError, Result};
use crate::frequency::FrequencyTable;
use polars::prelude::*;
use std::cmp::Ordering;
use tally_data::field::parse_count;
use tally_data::{DataError, Diagnostics, IssueKind, RowIssue};

impl FrequencyTable {
    /// Columns: `label`, `count`, `proportion`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let total = self.total();
        let labels: Vec<&str> = self.labels();
        let counts: Vec<u64> = self.entries().iter().map(|e| e.count).collect();
        let proportions: Vec<f64> = counts
            .iter()
            .map(|&c| if total > 0 { c as f64 / total as f64 } else { 0.0 })
            .collect();

        Ok(DataFrame::new(vec![
            Column::new("label".into(), labels),
            Column::new("count".into(), counts),
            Column::new("proportion".into(), proportions),
        ])?)
    }
}

impl GroupedSummary {
    /// One column per grouping key, then `count`, `proportion` and, for
    /// ordinal summaries, `cumulative`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = self
            .keys()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<&str> = self.rows().iter().map(|r| r.key[i].as_str()).collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();

        let counts: Vec<u64> = self.rows().iter().map(|r| r.count).collect();
        let proportions: Vec<f64> = self.rows().iter().map(|r| r.proportion).collect();
        columns.push(Column::new("count".into(), counts));
        columns.push(Column::new("proportion".into(), proportions));

        if self.rows().iter().any(|r| r.cumulative.is_some()) {
            let cumulative: Vec<Option<f64>> = self.rows().iter().map(|r| r.cumulative).collect();
            columns.push(Column::new("cumulative".into(), cumulative));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Grouped counts and proportions computed on a `DataFrame`.
///
/// Agrees with [`GroupBy::run`](crate::aggregate::GroupBy::run) on the same
/// data: key columns are compared as text, rows with a null key are skipped
/// and reported, and weights are read with [`parse_count`], so `"1,024"` and
/// `"12.0"` count while `"-3"`, `"12.5"` and free text are reported. Line
/// numbers are 1-based frame rows. The result has the key columns (as
/// strings, in natural key order) followed by `count` and `proportion`.
pub fn grouped_frame(
    df: &DataFrame,
    keys: &[&str],
    partition: &Partition,
    weight: Option<&str>,
) -> Result<(DataFrame, Diagnostics)> {
    if keys.is_empty() {
        return Err(RecodeError::NoGroupKeys);
    }
    for (i, key) in keys.iter().enumerate() {
        if keys[..i].contains(key) {
            return Err(RecodeError::DuplicateKey((*key).to_string()));
        }
    }
    for key in partition.keys() {
        if !keys.contains(&key.as_str()) {
            return Err(RecodeError::InvalidPartition(key.clone()));
        }
    }

    let key_text = keys
        .iter()
        .map(|k| text_column(df, k))
        .collect::<Result<Vec<_>>>()?;
    let weight_text = weight.map(|w| text_column(df, w)).transpose()?;

    let mut diagnostics = Diagnostics::new();
    let mut kept: Vec<usize> = Vec::with_capacity(df.height());
    let mut weights: Vec<u64> = Vec::with_capacity(df.height());
    let mut total = 0u64;

    'rows: for i in 0..df.height() {
        let line = i + 1;
        for (name, values) in keys.iter().zip(&key_text) {
            if values[i].is_none() {
                diagnostics.push(RowIssue::new(line, *name, IssueKind::Missing));
                continue 'rows;
            }
        }

        let w = match (weight, &weight_text) {
            (Some(column), Some(values)) => {
                let parsed = values[i].as_deref().map_or(Err(IssueKind::Missing), parse_count);
                match parsed {
                    Ok(w) => w,
                    Err(kind) => {
                        diagnostics.push(RowIssue::new(line, column, kind));
                        continue;
                    }
                }
            }
            _ => 1,
        };

        let Some(next) = total.checked_add(w) else {
            let column = weight.unwrap_or(keys[0]);
            diagnostics.push(RowIssue::new(line, column, IssueKind::CountOverflow(w)));
            continue;
        };
        total = next;
        kept.push(i);
        weights.push(w);
    }

    let mut columns: Vec<Column> = keys
        .iter()
        .zip(&key_text)
        .map(|(name, values)| {
            let kept_values: Vec<Option<&str>> =
                kept.iter().map(|&i| values[i].as_deref()).collect();
            Column::new((*name).into(), kept_values)
        })
        .collect();
    columns.push(Column::new(WEIGHT.into(), weights));
    let rows = DataFrame::new(columns)?;

    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    let denominator = match partition {
        Partition::Overall => col("count").sum(),
        Partition::Within(cell) => {
            let cell_exprs: Vec<Expr> = cell.iter().map(|k| col(k.as_str())).collect();
            col("count").sum().over(cell_exprs)
        }
    };

    let grouped = rows
        .lazy()
        .group_by(key_exprs)
        .agg([col(WEIGHT).sum().alias("count")])
        .filter(col("count").gt(lit(0)))
        .with_column(
            (col("count").cast(DataType::Float64) / denominator.cast(DataType::Float64))
                .alias("proportion"),
        )
        .collect()?;

    tracing::debug!(
        keys = ?keys,
        groups = grouped.height(),
        skipped = diagnostics.flagged_lines().len(),
        "aggregated frame"
    );
    Ok((sort_by_keys(&grouped, keys)?, diagnostics))
}

/// Internal name of the per-row weight column.
const WEIGHT: &str = "__tally_weight";

/// Values of a column cast to text, nulls as `None`.
fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name).map_err(|_| DataError::UnknownColumn(name.to_string()))?;
    let text = column.cast(&DataType::String)?;
    let values = text
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Reorder rows by key columns using the natural key order.
fn sort_by_keys(df: &DataFrame, keys: &[&str]) -> Result<DataFrame> {
    let key_text = keys
        .iter()
        .map(|k| text_column(df, k))
        .collect::<Result<Vec<_>>>()?;

    let mut order: Vec<usize> = (0..df.height()).collect();
    order.sort_by(|&a, &b| {
        key_text
            .iter()
            .map(|values| {
                natural_compare(
                    values[a].as_deref().unwrap_or_default(),
                    values[b].as_deref().unwrap_or_default(),
                )
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let idx = IdxCa::from_vec(
        "order".into(),
        order.into_iter().map(|i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::GroupBy;
    use approx::assert_relative_eq;
    use tally_data::Table;

    #[test]
    fn test_frequency_to_dataframe() {
        let freq = FrequencyTable::from_counts([("A", 3), ("B", 1)]);
        let df = freq.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        for name in ["label", "count", "proportion"] {
            assert!(df.column(name).is_ok(), "missing column {name}");
        }
    }

    #[test]
    fn test_grouped_summary_to_dataframe() {
        let table = Table::from_rows(["g"], [["x"], ["y"], ["x"]]).unwrap();
        let (summary, _) = GroupBy::new(["g"]).run(&table).unwrap();
        let df = summary.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }

    fn text(df: &DataFrame, name: &str) -> Vec<String> {
        text_column(df, name).unwrap().into_iter().flatten().collect()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    fn counts(df: &DataFrame) -> Vec<u64> {
        df.column("count")
            .unwrap()
            .as_materialized_series()
            .u64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_grouped_frame_counts_rows() {
        let table = Table::from_rows(
            ["year", "sex"],
            [
                ["2020", "F"],
                ["2020", "M"],
                ["2020", "M"],
                ["2021", "F"],
                ["2021", ""],
            ],
        )
        .unwrap();
        let df = table.to_dataframe().unwrap();

        let (frame, issues) =
            grouped_frame(&df, &["year", "sex"], &Partition::within(["year"]), None).unwrap();
        assert_eq!(frame.height(), 3);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues()[0].line, 5);

        let proportions = floats(&frame, "proportion");
        assert_relative_eq!(proportions[0], 1.0 / 3.0);
        assert_relative_eq!(proportions[1], 2.0 / 3.0);
        assert_relative_eq!(proportions[2], 1.0);
    }

    #[test]
    fn test_grouped_frame_matches_group_by_with_text_weights() {
        let table = Table::from_rows(
            ["year", "sex", "n"],
            [
                ["10", "F", "12.0"],
                ["9", "F", "1,024"],
                ["9", "M", "-3"],
                ["10", "M", "abc"],
                ["100", "F", "5"],
                ["10", "M", "3"],
                ["", "F", "4"],
                ["9", "M", "12.5"],
            ],
        )
        .unwrap();
        let partition = Partition::within(["year"]);

        let (summary, summary_issues) = GroupBy::new(["year", "sex"])
            .partition(partition.clone())
            .weighted("n")
            .run(&table)
            .unwrap();
        let expected = summary.to_dataframe().unwrap();

        let df = table.to_dataframe().unwrap();
        let (frame, frame_issues) =
            grouped_frame(&df, &["year", "sex"], &partition, Some("n")).unwrap();

        assert_eq!(text(&frame, "year"), vec!["9", "10", "10", "100"]);
        assert_eq!(text(&frame, "year"), text(&expected, "year"));
        assert_eq!(text(&frame, "sex"), text(&expected, "sex"));
        assert_eq!(counts(&frame), vec![1024, 12, 3, 5]);
        assert_eq!(counts(&frame), counts(&expected));
        for (a, b) in floats(&frame, "proportion").iter().zip(floats(&expected, "proportion")) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }

        assert_eq!(frame_issues, summary_issues);
        assert_eq!(
            frame_issues.issues().iter().map(|i| i.line).collect::<Vec<_>>(),
            vec![3, 4, 7, 8]
        );
    }

    #[test]
    fn test_grouped_frame_reports_overflowing_weights() {
        let df = Table::from_rows(
            ["g", "n"],
            [["a", "10000000000000000000"], ["a", "10000000000000000000"]],
        )
        .unwrap()
        .to_dataframe()
        .unwrap();

        let (frame, issues) = grouped_frame(&df, &["g"], &Partition::Overall, Some("n")).unwrap();
        assert_eq!(counts(&frame), vec![10_000_000_000_000_000_000]);
        assert_eq!(issues.issues()[0].kind, IssueKind::CountOverflow(10_000_000_000_000_000_000));
    }

    #[test]
    fn test_grouped_frame_rejects_bad_partition() {
        let df = Table::from_rows(["a"], [["1"]]).unwrap().to_dataframe().unwrap();
        assert!(matches!(
            grouped_frame(&df, &["a"], &Partition::within(["b"]), None),
            Err(RecodeError::InvalidPartition(_))
        ));
    }
}
