//! Ordered levels for ordinal responses (ratings, Likert items).

use crate::error::{RecodeError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An ordered list of levels, lowest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OrdinalScale {
    levels: Vec<String>,
}

impl OrdinalScale {
    /// Create a scale. Levels must be distinct.
    pub fn new<S: Into<String>>(levels: impl IntoIterator<Item = S>) -> Result<Self> {
        let levels: Vec<String> = levels.into_iter().map(Into::into).collect();
        for (i, level) in levels.iter().enumerate() {
            if levels[..i].contains(level) {
                return Err(RecodeError::DuplicateLevel(level.clone()));
            }
        }
        Ok(Self { levels })
    }

    /// Levels, lowest first.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the scale has no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Rank of a level.
    pub fn position(&self, level: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == level)
    }

    /// Whether a label is a level of the scale.
    pub fn contains(&self, level: &str) -> bool {
        self.position(level).is_some()
    }

    /// Scale order. Levels come before unknown labels; unknown labels
    /// compare equal to each other.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.position(a), self.position(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl TryFrom<Vec<String>> for OrdinalScale {
    type Error = RecodeError;

    fn try_from(levels: Vec<String>) -> Result<Self> {
        Self::new(levels)
    }
}

impl From<OrdinalScale> for Vec<String> {
    fn from(scale: OrdinalScale) -> Self {
        scale.levels
    }
}
