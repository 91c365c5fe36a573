//! Field parsing for hand-entered survey cells.
//!
//! Survey exports carry numbers the way respondents typed them: thousands
//! separators, a leading currency symbol, stray whitespace. These helpers
//! accept that and reject anything else with an [`IssueKind`].

use crate::diagnostics::IssueKind;

const CURRENCY_SYMBOLS: [char; 3] = ['$', '£', '€'];

/// Strip a leading currency symbol and thousands separators.
fn clean_numeric(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix(|c: char| CURRENCY_SYMBOLS.contains(&c))
        .unwrap_or(trimmed);
    trimmed.trim().chars().filter(|c| *c != ',').collect()
}

/// Parse a numeric cell.
///
/// Accepts `"55000"`, `"55,000"`, `" $55,000.50 "`. Rejects empty strings,
/// free text such as `"55k"`, and non-finite values.
pub fn parse_number(raw: &str) -> Result<f64, IssueKind> {
    let cleaned = clean_numeric(raw);
    if cleaned.is_empty() {
        return Err(IssueKind::Missing);
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(IssueKind::NotNumeric(raw.trim().to_string())),
    }
}

/// Parse a non-negative numeric cell.
pub fn parse_non_negative(raw: &str) -> Result<f64, IssueKind> {
    let value = parse_number(raw)?;
    if value < 0.0 {
        return Err(IssueKind::Negative(value));
    }
    Ok(value)
}

/// Parse a count (non-negative integer) cell, such as a frequency weight.
///
/// `"1,024"` and `"12.0"` are accepted; `"12.5"` is not.
pub fn parse_count(raw: &str) -> Result<u64, IssueKind> {
    let value = parse_non_negative(raw)?;
    if value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(IssueKind::NotInteger(raw.trim().to_string()));
    }
    Ok(value as u64)
}
