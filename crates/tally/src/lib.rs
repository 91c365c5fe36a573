#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;
pub mod presets;

// Re-export main types from sub-crates
pub use tally_data as data;
pub use tally_output as output;
pub use tally_recode as recode;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput, ScreenConfig};
pub use presets::{Currency, JobCategory, Preset, RuleSet};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
