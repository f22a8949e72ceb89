//! Value coercions shared by the filter, sort and query-builder modules.
//!
//! Every place that needs to treat a JSON value "as a number", "as a date"
//! and so on goes through these functions, so the failure behavior is the
//! same everywhere: a coercion that does not apply returns `None` instead of
//! a NaN-like value.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::infer::FieldType;

static DATE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a numeric string. Blank input and non-finite results are rejected.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses the leading integer of a string (`"10px"` is `10`).
///
/// Leading whitespace and a single sign are accepted; at least one digit
/// must follow.
pub fn parse_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// `"true"` in any letter case is true; everything else is false.
pub fn parse_bool(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

/// Returns `true` if the string starts with a `YYYY-MM-DD` date.
pub fn looks_like_date(s: &str) -> bool {
    DATE_PREFIX.is_match(s)
}

/// Parses an ISO-8601 style date or datetime into epoch milliseconds.
///
/// Datetimes without an offset are read as UTC.
pub fn parse_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Coerces a JSON value to a number: JSON numbers and numeric strings.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Coerces a JSON value to an integer. Fractions are truncated and strings
/// use [`parse_integer`].
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_integer(s),
        _ => None,
    }
}

/// Coerces a JSON value to a boolean: `true`, or the string `"true"`.
pub fn coerce_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => parse_bool(s),
        _ => false,
    }
}

/// Coerces a JSON value to epoch milliseconds.
///
/// Numbers are taken as milliseconds already; strings are parsed with
/// [`parse_date`].
pub fn coerce_date(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

/// Truthiness: null, false, zero and the empty string are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders a value as display text.
///
/// Integral numbers print without a fraction, arrays join their elements
/// with commas (nulls become empty), and objects collapse to a fixed
/// placeholder.
pub fn coerce_string(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(number_text(n)),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => coerce_string(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
    }
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64's Display drops a zero fraction ("30" rather than "30.0").
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

/// Builds a JSON number, preferring an integer representation.
///
/// Non-finite input yields `null`.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Splits comma-separated input into trimmed tokens.
pub fn split_list(s: &str) -> Vec<&str> {
    s.split(',').map(str::trim).collect()
}

/// Interprets a raw filter value according to the declared field type.
///
/// Null and empty-string values are returned unchanged so the evaluator can
/// apply its null rules. Arrays (such as an `inRange` pair) are converted
/// element by element unless the declared type is itself `Array`. Values
/// that fail to coerce are kept as they are.
pub fn parse_filter_value(value: &Value, field_type: FieldType) -> Value {
    match value {
        Value::Null => return Value::Null,
        Value::String(s) if s.is_empty() => return value.clone(),
        Value::Array(items) if field_type != FieldType::Array => {
            return Value::Array(
                items
                    .iter()
                    .map(|item| parse_filter_value(item, field_type))
                    .collect(),
            );
        }
        _ => {}
    }

    match field_type {
        FieldType::Number => coerce_number(value)
            .map(number_value)
            .unwrap_or_else(|| value.clone()),
        FieldType::Boolean => Value::Bool(coerce_boolean(value)),
        FieldType::Date => coerce_date(value)
            .map(Value::from)
            .unwrap_or_else(|| value.clone()),
        FieldType::Array => match value {
            Value::String(s) => Value::Array(split_list(s).into_iter().map(Value::from).collect()),
            _ => value.clone(),
        },
        FieldType::String | FieldType::Null | FieldType::Object => value.clone(),
    }
}
