//! CSV and JSON export of summaries and diagnostics.

use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tally_data::Diagnostics;
use tally_recode::{FrequencyTable, GroupedSummary};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer produced invalid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExportError::InvalidFormat(path.display().to_string()))?;
        ext.parse()
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// CSV writer without automatic headers; callers write their own.
fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new().has_headers(false).from_writer(vec![])
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// One frequency table row, flattened for CSV.
#[derive(Debug, Serialize)]
struct FrequencyRecord<'a> {
    label: &'a str,
    count: u64,
    proportion: f64,
}

impl Exporter for FrequencyTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = writer();
                wtr.write_record(["label", "count", "proportion"])?;
                let total = self.total();
                for entry in self.entries() {
                    let proportion = if total > 0 {
                        entry.count as f64 / total as f64
                    } else {
                        0.0
                    };
                    wtr.serialize(FrequencyRecord {
                        label: &entry.label,
                        count: entry.count,
                        proportion,
                    })?;
                }
                finish(wtr)
            }
            _ => json(self, format),
        }
    }
}

impl Exporter for GroupedSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let has_cumulative = self.rows().iter().any(|r| r.cumulative.is_some());
                let mut wtr = writer();

                let mut header: Vec<&str> = self.keys().iter().map(String::as_str).collect();
                header.extend(["count", "proportion"]);
                if has_cumulative {
                    header.push("cumulative");
                }
                wtr.write_record(&header)?;

                for row in self.rows() {
                    let mut record = row.key.clone();
                    record.push(row.count.to_string());
                    record.push(row.proportion.to_string());
                    if has_cumulative {
                        record.push(row.cumulative.map(|c| c.to_string()).unwrap_or_default());
                    }
                    wtr.write_record(&record)?;
                }
                finish(wtr)
            }
            _ => json(self, format),
        }
    }
}

/// One row issue, flattened for CSV.
#[derive(Debug, Serialize)]
struct IssueRecord<'a> {
    row: usize,
    column: &'a str,
    issue: String,
}

impl Exporter for Diagnostics {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = writer();
                wtr.write_record(["row", "column", "issue"])?;
                for issue in self.issues() {
                    wtr.serialize(IssueRecord {
                        row: issue.line,
                        column: &issue.column,
                        issue: issue.kind.to_string(),
                    })?;
                }
                finish(wtr)
            }
            _ => json(self, format),
        }
    }
}
