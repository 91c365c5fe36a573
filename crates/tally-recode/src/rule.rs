//! Re-coding rules.

use crate::error::{RecodeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How a rule recognises a raw value.
///
/// Raw values are trimmed before matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Case-insensitive equality.
    Exact(String),

    /// Regular expression search. Use `(?i)` for case-insensitive matching.
    Regex(String),

    /// Case-insensitive equality with any of the alternatives.
    AnyOf(Vec<String>),
}

/// A (pattern, canonical label) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Pattern to match.
    pub pattern: Pattern,

    /// Label assigned on match.
    pub label: String,
}

impl Rule {
    /// Create a rule.
    pub fn new(pattern: Pattern, label: impl Into<String>) -> Self {
        Self {
            pattern,
            label: label.into(),
        }
    }

    /// Case-insensitive exact match.
    pub fn exact(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(Pattern::Exact(value.into()), label)
    }

    /// Regular expression search.
    pub fn regex(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(Pattern::Regex(pattern.into()), label)
    }

    /// Case-insensitive match against any alternative.
    pub fn any_of<S: Into<String>>(
        values: impl IntoIterator<Item = S>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(
            Pattern::AnyOf(values.into_iter().map(Into::into).collect()),
            label,
        )
    }
}

/// A rule ready for matching.
#[derive(Debug, Clone)]
pub(crate) enum Matcher {
    Exact(String),
    Regex(Regex),
    AnyOf(Vec<String>),
}

impl Matcher {
    pub(crate) fn compile(pattern: &Pattern) -> Result<Self> {
        Ok(match pattern {
            Pattern::Exact(value) => Self::Exact(fold(value)),
            Pattern::Regex(expr) => {
                Self::Regex(Regex::new(expr).map_err(|source| RecodeError::InvalidPattern {
                    pattern: expr.clone(),
                    source,
                })?)
            }
            Pattern::AnyOf(values) => Self::AnyOf(values.iter().map(|v| fold(v)).collect()),
        })
    }

    /// `trimmed` is the trimmed raw value, `folded` its case-folded form.
    pub(crate) fn is_match(&self, trimmed: &str, folded: &str) -> bool {
        match self {
            Self::Exact(value) => value == folded,
            Self::Regex(re) => re.is_match(trimmed),
            Self::AnyOf(values) => values.iter().any(|v| v == folded),
        }
    }
}

/// Trim and lowercase for case-insensitive comparison.
pub(crate) fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}
