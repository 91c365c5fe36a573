//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or reshaping a table.
///
/// Malformed cell values are not errors; they are reported through
/// [`Diagnostics`](crate::Diagnostics).
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Input has no header row
    #[error("Input has no header row")]
    EmptyHeader,

    /// Header names a column twice
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Column lookup failed
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Row width does not match the header
    #[error("Row {line} has {actual} fields, expected {expected}")]
    RaggedRow {
        /// 1-based data row number
        line: usize,
        /// Header width
        expected: usize,
        /// Fields found in the row
        actual: usize,
    },

    /// Column values do not line up with the table rows
    #[error("Length mismatch: table has {expected} rows, got {actual} values")]
    LengthMismatch {
        /// Number of rows in the table
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },
}
