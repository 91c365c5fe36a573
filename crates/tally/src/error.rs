//! Error types for pipelines.

use tally_data::DataError;
use tally_output::ReportError;
use tally_recode::RecodeError;
use thiserror::Error;

/// Errors that stop a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Pipeline file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Pipeline file is not valid TOML or has unknown fields.
    #[error("Invalid pipeline file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Pipeline settings contradict each other.
    #[error("Invalid pipeline: {0}")]
    Invalid(String),

    /// Loading or screening failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Re-coding, lumping or aggregation failed.
    #[error(transparent)]
    Recode(#[from] RecodeError),

    /// Report assembly failed.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result type for pipelines.
pub type Result<T> = std::result::Result<T, PipelineError>;
