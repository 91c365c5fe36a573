//! Job title buckets for free-text survey answers.
//!
//! Titles are matched in the order of [`JobCategory::all`], so a title that
//! names both a seniority and a trade ("Engineering Manager") lands in
//! [`JobCategory::Management`].

use super::RuleSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_recode::{OTHER, Rule};

/// Broad occupational groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobCategory {
    /// Managers, directors and executives
    Management,

    /// Software, hardware and other engineers
    Engineering,

    /// Analysts, data scientists and researchers
    DataAnalysis,

    /// Teachers and academics
    Education,

    /// Clinical and care staff
    Healthcare,

    /// Office and administrative support
    Administrative,

    /// Accounting and finance
    Finance,

    /// Legal professions
    Legal,

    /// Sales, marketing and communications
    SalesMarketing,

    /// Anything else
    Other,
}

impl JobCategory {
    /// Returns all categories in matching order, `Other` last.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Management,
            Self::Engineering,
            Self::DataAnalysis,
            Self::Education,
            Self::Healthcare,
            Self::Administrative,
            Self::Finance,
            Self::Legal,
            Self::SalesMarketing,
            Self::Other,
        ]
    }

    /// Canonical label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Management => "Management",
            Self::Engineering => "Engineering",
            Self::DataAnalysis => "Data & Analysis",
            Self::Education => "Education",
            Self::Healthcare => "Healthcare",
            Self::Administrative => "Administrative",
            Self::Finance => "Finance",
            Self::Legal => "Legal",
            Self::SalesMarketing => "Sales & Marketing",
            Self::Other => OTHER,
        }
    }

    /// Regular expression recognising the category, `None` for `Other`.
    pub const fn pattern(&self) -> Option<&'static str> {
        match self {
            Self::Management => Some(
                r"(?i)\b(manager|director|head of|chief|vp|vice president|president|supervisor|ceo|cto|cfo|coo)\b",
            ),
            Self::Engineering => {
                Some(r"(?i)engineer|developer|programmer|software|devops|architect")
            }
            Self::DataAnalysis => {
                Some(r"(?i)analyst|data scien|statistic|research|economist")
            }
            Self::Education => {
                Some(r"(?i)teacher|professor|lecturer|instructor|tutor|librarian|educator")
            }
            Self::Healthcare => Some(
                r"(?i)nurse|physician|doctor|pharmacist|therapist|clinic|medical|dentist",
            ),
            Self::Administrative => Some(
                r"(?i)admin|assistant|coordinator|clerk|receptionist|secretary|office",
            ),
            Self::Finance => {
                Some(r"(?i)accountant|accounting|auditor|bookkeeper|controller|financ|payroll")
            }
            Self::Legal => Some(r"(?i)lawyer|attorney|paralegal|counsel|legal"),
            Self::SalesMarketing => {
                Some(r"(?i)sales|marketing|account executive|communications|recruit")
            }
            Self::Other => None,
        }
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Rules mapping job titles to [`JobCategory`] labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobTitleRules;

impl RuleSet for JobTitleRules {
    fn rules(&self) -> Vec<Rule> {
        JobCategory::all()
            .into_iter()
            .filter_map(|c| c.pattern().map(|p| Rule::regex(p, c.label())))
            .collect()
    }
}
