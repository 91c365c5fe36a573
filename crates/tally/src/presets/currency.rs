//! Salary currency buckets.

use super::RuleSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_recode::{OTHER, Rule};

/// Currencies reported separately in salary surveys; everything else is
/// [`Currency::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// US dollar
    Usd,

    /// Canadian dollar
    Cad,

    /// Pound sterling
    Gbp,

    /// Euro
    Eur,

    /// Australian and New Zealand dollars, reported together
    AudNzd,

    /// Any other currency
    Other,
}

impl Currency {
    /// Returns all buckets, `Other` last.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Usd,
            Self::Cad,
            Self::Gbp,
            Self::Eur,
            Self::AudNzd,
            Self::Other,
        ]
    }

    /// Canonical label.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cad => "CAD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
            Self::AudNzd => "AUD/NZD",
            Self::Other => OTHER,
        }
    }

    /// Returns the full currency name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Usd => "US Dollar",
            Self::Cad => "Canadian Dollar",
            Self::Gbp => "Pound Sterling",
            Self::Eur => "Euro",
            Self::AudNzd => "Australian / New Zealand Dollar",
            Self::Other => "Other",
        }
    }

    /// Lowercase spellings that map to this bucket.
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Usd => &["usd", "us$", "us dollar", "us dollars", "u.s. dollars"],
            Self::Cad => &["cad", "c$", "ca$", "canadian dollar", "canadian dollars"],
            Self::Gbp => &["gbp", "£", "pound", "pounds", "pound sterling", "sterling"],
            Self::Eur => &["eur", "€", "euro", "euros"],
            Self::AudNzd => &[
                "aud/nzd",
                "aud",
                "nzd",
                "australian dollar",
                "australian dollars",
                "new zealand dollar",
                "new zealand dollars",
            ],
            Self::Other => &[],
        }
    }

    /// Parse a bucket from its canonical label (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::all()
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }

    /// Bucket for a raw survey answer; unknown answers are `Other`.
    pub fn parse(raw: &str) -> Self {
        let folded = raw.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|c| c.aliases().contains(&folded.as_str()))
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Rules mapping currency answers to [`Currency`] codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrencyRules;

impl RuleSet for CurrencyRules {
    fn rules(&self) -> Vec<Rule> {
        Currency::all()
            .into_iter()
            .filter(|c| !c.aliases().is_empty())
            .map(|c| Rule::any_of(c.aliases().iter().copied(), c.code()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_currencies() {
        let all = Currency::all();
        assert_eq!(all.len(), 6);
        assert_eq!(all.last(), Some(&Currency::Other));
    }

    #[rstest]
    #[case("USD", Currency::Usd)]
    #[case(" usd ", Currency::Usd)]
    #[case("Canadian Dollars", Currency::Cad)]
    #[case("£", Currency::Gbp)]
    #[case("Euro", Currency::Eur)]
    #[case("NZD", Currency::AudNzd)]
    #[case("AUD/NZD", Currency::AudNzd)]
    #[case("JPY", Currency::Other)]
    #[case("", Currency::Other)]
    fn test_parse(#[case] raw: &str, #[case] expected: Currency) {
        assert_eq!(Currency::parse(raw), expected);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Currency::from_code("aud/nzd"), Some(Currency::AudNzd));
        assert_eq!(Currency::from_code("Other"), Some(Currency::Other));
        assert_eq!(Currency::from_code("JPY"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Currency::AudNzd), "AUD/NZD");
        assert_eq!(Currency::Gbp.name(), "Pound Sterling");
    }

    #[test]
    fn test_rules_agree_with_parse() {
        let map = CurrencyRules.category_map().unwrap();
        for raw in ["usd", "C$", "pounds", "€", "aud", "yen", "  EUR  "] {
            assert_eq!(map.normalize(raw), Currency::parse(raw).code(), "{raw}");
        }
    }
}
