#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod category_map;
pub mod error;
pub mod frame;
pub mod frequency;
pub mod lump;
pub mod ordinal;
pub mod rule;

pub use aggregate::{GroupBy, GroupRow, GroupedSummary, Partition, column_frequencies};
pub use category_map::{CategoryMap, CategoryMapConfig, OTHER};
pub use error::{RecodeError, Result};
pub use frame::grouped_frame;
pub use frequency::{CategoryCount, FrequencyTable};
pub use lump::{LumpRule, lump, lump_column, lump_column_into, lump_into};
pub use ordinal::OrdinalScale;
pub use rule::{Pattern, Rule};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
