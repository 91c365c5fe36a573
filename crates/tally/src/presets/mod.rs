//! Built-in rule sets for common survey fields.
//!
//! A preset can be used on its own or placed after custom rules in a
//! pipeline, so custom rules take precedence.

pub mod currency;
pub mod job_title;

pub use currency::{Currency, CurrencyRules};
pub use job_title::{JobCategory, JobTitleRules};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tally_recode::{CategoryMap, OTHER, RecodeError, Rule};

/// An ordered rule list with a fallback label.
pub trait RuleSet {
    /// Rules in matching order.
    fn rules(&self) -> Vec<Rule>;

    /// Label for values no rule matches.
    fn fallback(&self) -> &str {
        OTHER
    }

    /// Compile into a [`CategoryMap`].
    fn category_map(&self) -> Result<CategoryMap, RecodeError> {
        CategoryMap::with_fallback(self.rules(), self.fallback())
    }

    /// Every label the rule set can produce, fallback last.
    fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for rule in self.rules() {
            if !labels.contains(&rule.label) {
                labels.push(rule.label);
            }
        }
        if !labels.iter().any(|l| l == self.fallback()) {
            labels.push(self.fallback().to_string());
        }
        labels
    }
}

/// Presets selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Salary currency codes.
    Currency,

    /// Free-text job titles.
    JobTitle,
}

impl Preset {
    /// Returns all presets.
    pub fn all() -> Vec<Self> {
        vec![Self::Currency, Self::JobTitle]
    }

    /// Name used in pipeline files and on the command line.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::JobTitle => "job-title",
        }
    }

    /// One-line description.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Currency => "Currency codes: USD, CAD, GBP, EUR, AUD/NZD, everything else Other",
            Self::JobTitle => "Job titles bucketed into broad occupational groups",
        }
    }

    /// The rule set behind this preset.
    pub fn rule_set(&self) -> &'static dyn RuleSet {
        match self {
            Self::Currency => &CurrencyRules,
            Self::JobTitle => &JobTitleRules,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| format!("unknown preset '{s}'"))
    }
}
