//! Lenient field parsing for REST payloads.
//!
//! Both platforms mix numbers, numeric strings and JSON-encoded arrays for the
//! same logical field. Everything here degrades to `None` instead of failing,
//! so one malformed field never poisons the rest of a record.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use smol_str::SmolStr;
use std::str::FromStr;

/// Deserialize an identifier that may arrive as either a string or a number.
pub fn de_str_or_number<'de, D>(deserializer: D) -> Result<SmolStr, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(SmolStr::new(s)),
        Value::Number(n) => Ok(SmolStr::new(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number identifier, found {other}"
        ))),
    }
}

/// Parse a [`Decimal`] from a JSON number or numeric string.
///
/// Accepts scientific notation (`"1e-3"`). Empty strings, `"NaN"` and any
/// other non-numeric value yield `None`.
pub fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Parse a [`Decimal`] from text, accepting plain and scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parse an integer from a JSON number or numeric string.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse RFC 3339 timestamps, bare dates (`2025-03-19`) and the space
/// separated form Gamma uses for `closedTime`.
pub fn datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a list that may be a JSON array or a JSON-encoded array string.
///
/// ```text
/// ["Yes", "No"]          -> Some(["Yes", "No"])
/// "[\"Yes\", \"No\"]"    -> Some(["Yes", "No"])
/// "not json"             -> None
/// ```
pub fn list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s.trim()) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a list of labels, stringifying scalar entries.
pub fn string_list(value: &Value) -> Option<Vec<String>> {
    list(value).map(|items| {
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect()
    })
}
