//! Categorical normalizer.
//!
//! A [`CategoryMap`] turns raw survey answers into canonical labels with an
//! ordered rule list. The first matching rule wins; a value no rule matches
//! gets the fallback label. Matching cannot fail, so every raw value maps to
//! exactly one label.

use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::rule::{Matcher, Rule, fold};
use serde::{Deserialize, Serialize};
use tally_data::{Diagnostics, IssueKind, RowIssue, Table};

/// Label for unmatched and lumped values.
pub const OTHER: &str = "Other";

#[derive(Debug, Clone)]
struct CompiledRule {
    matcher: Matcher,
    label: String,
}

/// Ordered (pattern, canonical label) rules with a fallback label.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    rules: Vec<Rule>,
    compiled: Vec<CompiledRule>,
    fallback: String,
}

/// Serializable form of a [`CategoryMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapConfig {
    /// Rules, tried in order.
    #[serde(default)]
    pub rules: Vec<Rule>,

    /// Label for values no rule matches (default: `"Other"`).
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    OTHER.to_string()
}

impl Default for CategoryMapConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            fallback: default_fallback(),
        }
    }
}

impl CategoryMap {
    /// Compile rules with the `"Other"` fallback.
    ///
    /// Fails only if a regular expression does not compile.
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        Self::with_fallback(rules, OTHER)
    }

    /// Compile rules with a custom fallback label.
    pub fn with_fallback(rules: Vec<Rule>, fallback: impl Into<String>) -> Result<Self> {
        let compiled = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    matcher: Matcher::compile(&rule.pattern)?,
                    label: rule.label.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rules,
            compiled,
            fallback: fallback.into(),
        })
    }

    /// Compile from a config.
    pub fn from_config(config: &CategoryMapConfig) -> Result<Self> {
        Self::with_fallback(config.rules.clone(), config.fallback.clone())
    }

    /// Config this map was built from.
    pub fn to_config(&self) -> CategoryMapConfig {
        CategoryMapConfig {
            rules: self.rules.clone(),
            fallback: self.fallback.clone(),
        }
    }

    /// Canonical label for a raw value.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_recode::{CategoryMap, Rule};
    ///
    /// let map = CategoryMap::new(vec![
    ///     Rule::exact("usd", "USD"),
    ///     Rule::any_of(["aud", "nzd"], "AUD/NZD"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(map.normalize(" USD "), "USD");
    /// assert_eq!(map.normalize("nzd"), "AUD/NZD");
    /// assert_eq!(map.normalize("JPY"), "Other");
    /// ```
    pub fn normalize(&self, raw: &str) -> &str {
        let trimmed = raw.trim();
        let folded = fold(trimmed);
        self.compiled
            .iter()
            .find(|rule| rule.matcher.is_match(trimmed, &folded))
            .map_or(self.fallback.as_str(), |rule| rule.label.as_str())
    }

    /// Rules in matching order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Fallback label.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Every label the map can produce: rule labels in order, then the
    /// fallback, without repeats.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.rules.len() + 1);
        for label in self
            .rules
            .iter()
            .map(|r| r.label.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
        {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Normalize many values and count the labels.
    pub fn frequencies<S: AsRef<str>>(&self, values: impl IntoIterator<Item = S>) -> FrequencyTable {
        FrequencyTable::from_values(values.into_iter().map(|v| self.normalize(v.as_ref()).to_string()))
    }

    /// Write the canonical label of `source` into `target`.
    ///
    /// `target` is added, or replaced if it exists (it may equal `source`).
    /// Missing source cells stay missing and are reported.
    pub fn recode_column(
        &self,
        table: &Table,
        source: &str,
        target: &str,
    ) -> Result<(Table, Diagnostics)> {
        let index = table.column_index(source)?;
        let mut diagnostics = Diagnostics::new();

        let labels = table
            .records()
            .iter()
            .map(|record| match record.value(index) {
                Some(raw) => Some(self.normalize(raw).to_string()),
                None => {
                    diagnostics.push(RowIssue::new(record.line(), source, IssueKind::Missing));
                    None
                }
            })
            .collect();

        let recoded = table.with_column(target, labels)?;
        tracing::debug!(
            source,
            target,
            rules = self.rules.len(),
            missing = diagnostics.len(),
            "recoded column"
        );
        Ok((recoded, diagnostics))
    }
}
