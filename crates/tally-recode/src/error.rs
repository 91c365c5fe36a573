//! Error types for re-coding and aggregation.

use tally_data::DataError;
use thiserror::Error;

/// Result type for re-coding operations.
pub type Result<T> = std::result::Result<T, RecodeError>;

/// Errors raised while building rules or setting up an aggregation.
///
/// Matching and counting themselves never fail; bad rows are reported as
/// diagnostics instead.
#[derive(Debug, Error)]
pub enum RecodeError {
    /// A rule pattern is not a valid regular expression
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// Pattern as written
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Partition keys must be a subset of the grouping keys
    #[error("Partition key {0:?} is not a grouping key")]
    InvalidPartition(String),

    /// No grouping keys given
    #[error("At least one grouping key is required")]
    NoGroupKeys,

    /// A grouping key was given twice
    #[error("Duplicate grouping key: {0}")]
    DuplicateKey(String),

    /// An ordinal scale lists a level twice
    #[error("Duplicate ordinal level: {0}")]
    DuplicateLevel(String),

    /// Lump rule parameter out of range
    #[error("Invalid lump rule: {0}")]
    InvalidLumpRule(String),

    /// Underlying table error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
