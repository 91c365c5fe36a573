#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod error;
pub mod field;
mod frame;
pub mod table;

pub use diagnostics::{AnomalyPolicy, Diagnostics, IssueKind, RowIssue};
pub use error::{DataError, Result};
pub use table::{CsvOptions, Record, Row, Table};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
