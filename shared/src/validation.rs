//! Boundary parsing and validation for raw form values
//!
//! Dates are parsed strictly; temperatures are parsed leniently (anything
//! that is not a number becomes "absent").

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::error::LifecycleError;
use crate::types::DATE_FORMAT;

// ============================================================================
// Text helpers
// ============================================================================

/// Trimmed value, or `None` when the field is missing or only whitespace
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Trimmed owned value, or `None` when blank
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

/// Require a non-blank value for `field`
pub fn require_text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, LifecycleError> {
    non_blank(Some(value)).ok_or(LifecycleError::MissingField { field })
}

/// Case-folded, trimmed catalog name
///
/// Folds every Unicode letter, so "Ñame" and "ñame" share a key.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// Dates
// ============================================================================

/// Parse a `YYYY-MM-DD` date strictly
///
/// Rejects unpadded components ("2024-1-5"), signed or extended years and
/// any trailing text; chrono alone would accept some of these.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, LifecycleError> {
    let trimmed = value.trim();
    let invalid = || LifecycleError::InvalidDateFormat {
        field,
        value: value.to_string(),
    };

    let bytes = trimmed.as_bytes();
    let well_shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid())
}

/// Parse an optional date; blank means absent
pub fn parse_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, LifecycleError> {
    non_blank(value).map(|v| parse_date(field, v)).transpose()
}

/// Format a date the way the boundary expects it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ============================================================================
// Numbers
// ============================================================================

/// Parse a temperature, coercing blank or non-numeric input to `None`
pub fn parse_temperature(value: Option<&str>) -> Option<Decimal> {
    non_blank(value).and_then(|v| Decimal::from_str(v).ok())
}

/// Accept a JSON string, number or null as optional text
///
/// Form clients send temperatures either as typed numbers or as the raw
/// text of an input box; anything else is treated as absent.
pub fn deserialize_lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
