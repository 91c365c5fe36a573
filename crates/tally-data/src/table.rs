//! In-memory tables.

use crate::diagnostics::{AnomalyPolicy, Diagnostics, IssueKind, RowIssue};
use crate::error::{DataError, Result};
use crate::field;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Options for reading delimited text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter (default: `,`).
    pub delimiter: u8,

    /// Cell contents treated as missing after trimming (default: `""`, `"NA"`).
    pub missing_markers: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            missing_markers: vec![String::new(), "NA".to_string()],
        }
    }
}

impl CsvOptions {
    fn is_missing(&self, cell: &str) -> bool {
        self.missing_markers.iter().any(|m| m == cell)
    }
}

/// One row of a [`Table`].
///
/// Values are positional against the owning table's columns; a cell is
/// `None` when it was empty or held a missing-value marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    line: usize,
    values: Vec<Option<String>>,
}

impl Record {
    /// Create a record with an explicit source line.
    pub const fn new(line: usize, values: Vec<Option<String>>) -> Self {
        Self { line, values }
    }

    /// 1-based data row number in the source. Survives filtering.
    pub const fn line(&self) -> usize {
        self.line
    }

    /// All cells.
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Cell at a column position.
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }
}

/// Borrowed view of a record with column lookup by name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    record: &'a Record,
}

impl<'a> Row<'a> {
    /// Underlying record.
    pub const fn record(&self) -> &'a Record {
        self.record
    }

    /// 1-based data row number in the source.
    pub const fn line(&self) -> usize {
        self.record.line
    }

    /// Text of a cell; `None` if missing or the column does not exist.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table
            .index
            .get(column)
            .and_then(|&i| self.record.value(i))
    }

    /// Numeric value of a cell.
    pub fn number(&self, column: &str) -> std::result::Result<f64, IssueKind> {
        self.get(column)
            .ok_or(IssueKind::Missing)
            .and_then(field::parse_number)
    }

    /// Count (non-negative integer) value of a cell.
    pub fn count(&self, column: &str) -> std::result::Result<u64, IssueKind> {
        self.get(column)
            .ok_or(IssueKind::Missing)
            .and_then(field::parse_count)
    }
}

/// Ordered columns plus rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Record>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(DataError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self {
            columns,
            index,
            records: Vec::new(),
        })
    }

    /// Build a table from string rows. Empty cells become missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_data::Table;
    ///
    /// let table = Table::from_rows(
    ///     ["title", "currency"],
    ///     [["Software Engineer", "USD"], ["Teacher", ""]],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.row(1).unwrap().get("currency"), None);
    /// ```
    pub fn from_rows<S, R, C>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut table = Self::new(columns)?;
        for (i, row) in rows.into_iter().enumerate() {
            let values = row
                .into_iter()
                .map(|c| {
                    let cell = c.as_ref().trim();
                    (!cell.is_empty()).then(|| cell.to_string())
                })
                .collect();
            table.push(Record::new(i + 1, values))?;
        }
        Ok(table)
    }

    /// Read a CSV file with default options.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path_with(path, &CsvOptions::default())
    }

    /// Read a CSV file.
    pub fn from_path_with(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "reading table");
        let file = File::open(path)?;
        Self::from_reader(file, options)
    }

    /// Read CSV from any reader. The first row is the header.
    pub fn from_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(DataError::EmptyHeader);
        }
        let mut table = Self::new(headers.iter())?;

        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let values = record
                .iter()
                .map(|cell| (!options.is_missing(cell)).then(|| cell.to_string()))
                .collect();
            table.push(Record::new(i + 1, values))?;
        }

        tracing::debug!(
            rows = table.len(),
            columns = table.width(),
            "table loaded"
        );
        Ok(table)
    }

    /// Append a record. Its width must match the header.
    pub fn push(&mut self, record: Record) -> Result<()> {
        if record.values.len() != self.columns.len() {
            return Err(DataError::RaggedRow {
                line: record.line,
                expected: self.columns.len(),
                actual: record.values.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }

    /// All records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Row view at a position.
    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.records.get(position).map(|record| Row {
            table: self,
            record,
        })
    }

    /// Iterate over row views.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |record| Row {
            table: self,
            record,
        })
    }

    /// Cells of one column.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = Option<&str>>> {
        let i = self.column_index(name)?;
        Ok(self.records.iter().map(move |r| r.value(i)))
    }

    /// Keep rows matching a predicate.
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(Row<'_>) -> bool,
    {
        let records = self
            .rows()
            .filter(|row| keep(*row))
            .map(|row| row.record.clone())
            .collect();

        Self {
            columns: self.columns.clone(),
            index: self.index.clone(),
            records,
        }
    }

    /// Add a column, or replace it if it exists.
    pub fn with_column(&self, name: &str, values: Vec<Option<String>>) -> Result<Self> {
        if values.len() != self.records.len() {
            return Err(DataError::LengthMismatch {
                expected: self.records.len(),
                actual: values.len(),
            });
        }

        let mut table = self.clone();
        match table.index.get(name).copied() {
            Some(i) => {
                for (record, value) in table.records.iter_mut().zip(values) {
                    record.values[i] = value;
                }
            }
            None => {
                table.index.insert(name.to_string(), table.columns.len());
                table.columns.push(name.to_string());
                for (record, value) in table.records.iter_mut().zip(values) {
                    record.values.push(value);
                }
            }
        }
        Ok(table)
    }

    /// Check that every row has a value in `column`.
    ///
    /// Returns the screened table and the issues found. With
    /// [`AnomalyPolicy::Drop`] flagged rows are removed.
    pub fn screen_present(
        &self,
        column: &str,
        policy: AnomalyPolicy,
    ) -> Result<(Self, Diagnostics)> {
        self.screen(column, policy, |row| match row.get(column) {
            Some(_) => Ok(()),
            None => Err(IssueKind::Missing),
        })
    }

    /// Check that every row has a numeric value in `column`.
    ///
    /// With `non_negative`, negative numbers are flagged too.
    pub fn screen_numeric(
        &self,
        column: &str,
        non_negative: bool,
        policy: AnomalyPolicy,
    ) -> Result<(Self, Diagnostics)> {
        self.screen(column, policy, |row| {
            let value = row.number(column)?;
            if non_negative && value < 0.0 {
                return Err(IssueKind::Negative(value));
            }
            Ok(())
        })
    }

    fn screen<F>(&self, column: &str, policy: AnomalyPolicy, check: F) -> Result<(Self, Diagnostics)>
    where
        F: Fn(Row<'_>) -> std::result::Result<(), IssueKind>,
    {
        self.column_index(column)?;

        let mut diagnostics = Diagnostics::new();
        let screened = self.filter(|row| match check(row) {
            Ok(()) => true,
            Err(kind) => {
                diagnostics.push(RowIssue::new(row.line(), column, kind));
                policy == AnomalyPolicy::Flag
            }
        });

        tracing::debug!(
            column,
            flagged = diagnostics.len(),
            kept = screened.len(),
            "screened column"
        );
        Ok((screened, diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salaries() -> Table {
        Table::from_rows(
            ["title", "salary", "currency"],
            [
                ["Software Engineer", "120,000", "USD"],
                ["Teacher", "55k", "CAD"],
                ["Nurse", "", "GBP"],
                ["Librarian", "-10", "USD"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut table = Table::new(["a", "b"]).unwrap();
        let err = table
            .push(Record::new(4, vec![Some("x".to_string())]))
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::RaggedRow {
                line: 4,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_row_access() {
        let table = salaries();
        let row = table.row(0).unwrap();
        assert_eq!(row.get("title"), Some("Software Engineer"));
        assert_eq!(row.number("salary"), Ok(120_000.0));
        assert_eq!(row.get("nope"), None);
        assert_eq!(table.row(2).unwrap().number("salary"), Err(IssueKind::Missing));
    }

    #[test]
    fn test_screen_numeric_flag_keeps_rows() {
        let table = salaries();
        let (screened, diagnostics) = table
            .screen_numeric("salary", true, AnomalyPolicy::Flag)
            .unwrap();

        assert_eq!(screened.len(), 4);
        assert_eq!(diagnostics.len(), 3);
        let lines: Vec<usize> = diagnostics.issues().iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn test_screen_numeric_drop_removes_rows() {
        let table = salaries();
        let (screened, diagnostics) = table
            .screen_numeric("salary", true, AnomalyPolicy::Drop)
            .unwrap();

        assert_eq!(screened.len(), 1);
        assert_eq!(screened.records()[0].line(), 1);
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_screen_numeric_allows_negative_when_asked() {
        let table = salaries();
        let (screened, diagnostics) = table
            .screen_numeric("salary", false, AnomalyPolicy::Drop)
            .unwrap();
        assert_eq!(screened.len(), 2);
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_screen_unknown_column() {
        let table = salaries();
        assert!(matches!(
            table.screen_present("bonus", AnomalyPolicy::Flag),
            Err(DataError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_with_column_adds_and_replaces() {
        let table = salaries();
        let labels = vec![
            Some("Engineering".to_string()),
            Some("Education".to_string()),
            Some("Healthcare".to_string()),
            None,
        ];

        let added = table.with_column("bucket", labels.clone()).unwrap();
        assert_eq!(added.width(), 4);
        assert_eq!(added.row(1).unwrap().get("bucket"), Some("Education"));

        let replaced = added.with_column("title", labels).unwrap();
        assert_eq!(replaced.width(), 4);
        assert_eq!(replaced.row(0).unwrap().get("title"), Some("Engineering"));
        assert_eq!(replaced.row(3).unwrap().get("title"), None);
    }

    #[test]
    fn test_with_column_length_mismatch() {
        let table = salaries();
        assert!(matches!(
            table.with_column("bucket", vec![None]),
            Err(DataError::LengthMismatch {
                expected: 4,
                actual: 1
            })
        ));
    }
}
