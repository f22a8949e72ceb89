//! Field type classification.
//!
//! [`FieldType`] tags every comparison and filter decision. [`infer_type`]
//! guesses a field's type from sampled values; the guess is a heuristic, and
//! mixed fields collapse to [`FieldType::String`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{coerce_number, looks_like_date, parse_date};
use crate::document::Seekable;

/// Maximum number of non-null values inspected by [`infer_type`].
pub const SAMPLE_LIMIT: usize = 10;

/// Semantic type of a document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text; also the fallback for anything ambiguous.
    #[default]
    String,
    /// Numbers and numeric strings.
    Number,
    /// `true` / `false`.
    Boolean,
    /// ISO-8601 dates and datetimes.
    Date,
    /// JSON arrays.
    Array,
    /// JSON null.
    Null,
    /// Nested JSON objects.
    Object,
}

impl FieldType {
    /// Classifies a single value.
    ///
    /// Strings with a valid `YYYY-MM-DD` prefix are dates.
    pub fn of(value: &Value) -> FieldType {
        match value {
            Value::Null => FieldType::Null,
            Value::Bool(_) => FieldType::Boolean,
            Value::Number(_) => FieldType::Number,
            Value::Array(_) => FieldType::Array,
            Value::Object(_) => FieldType::Object,
            Value::String(s) if is_date_string(s) => FieldType::Date,
            Value::String(_) => FieldType::String,
        }
    }

    /// Returns the lowercase name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Array => "array",
            FieldType::Null => "null",
            FieldType::Object => "object",
        }
    }

    /// Parses a lowercase type name. Unknown names fall back to `String`.
    pub fn parse(name: &str) -> FieldType {
        match name.trim().to_ascii_lowercase().as_str() {
            "number" => FieldType::Number,
            "boolean" | "bool" => FieldType::Boolean,
            "date" => FieldType::Date,
            "array" => FieldType::Array,
            "null" => FieldType::Null,
            "object" => FieldType::Object,
            _ => FieldType::String,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_date_string(s: &str) -> bool {
    looks_like_date(s) && parse_date(s).is_some()
}

/// Infers a field type from sample values.
///
/// Only the first [`SAMPLE_LIMIT`] non-null samples are inspected. The
/// checks run in order: all numeric, all boolean, all date strings, all
/// arrays. Anything else (including no samples at all) is `String`.
pub fn infer_type<'a, I>(samples: I) -> FieldType
where
    I: IntoIterator<Item = &'a Value>,
{
    let samples: Vec<&Value> = samples
        .into_iter()
        .filter(|v| !v.is_null())
        .take(SAMPLE_LIMIT)
        .collect();

    if samples.is_empty() {
        return FieldType::String;
    }

    if samples.iter().all(|v| coerce_number(v).is_some()) {
        FieldType::Number
    } else if samples.iter().all(|v| v.is_boolean()) {
        FieldType::Boolean
    } else if samples
        .iter()
        .all(|v| v.as_str().is_some_and(is_date_string))
    {
        FieldType::Date
    } else if samples.iter().all(|v| v.is_array()) {
        FieldType::Array
    } else {
        FieldType::String
    }
}

/// Infers the type of `field` from its values across `documents`.
pub fn infer_field_type<T: Seekable>(documents: &[T], field: &str) -> FieldType {
    infer_type(documents.iter().filter_map(|doc| doc.seek(field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infer(values: &[Value]) -> FieldType {
        infer_type(values.iter())
    }

    #[test]
    fn empty_samples_default_to_string() {
        assert_eq!(infer(&[]), FieldType::String);
        assert_eq!(infer(&[json!(null), json!(null)]), FieldType::String);
    }

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(infer(&[json!(1), json!(2.5)]), FieldType::Number);
        assert_eq!(infer(&[json!("10"), json!(3)]), FieldType::Number);
        assert_eq!(infer(&[json!(null), json!("7")]), FieldType::Number);
    }

    #[test]
    fn booleans() {
        assert_eq!(infer(&[json!(true), json!(false)]), FieldType::Boolean);
        assert_eq!(infer(&[json!(true), json!("false")]), FieldType::String);
    }

    #[test]
    fn dates_need_prefix_and_valid_parse() {
        assert_eq!(
            infer(&[json!("2024-01-15"), json!("2023-12-01T10:00:00Z")]),
            FieldType::Date
        );
        assert_eq!(infer(&[json!("2024-02-30")]), FieldType::String);
        assert_eq!(infer(&[json!("Jan 15, 2024")]), FieldType::String);
    }

    #[test]
    fn arrays() {
        assert_eq!(infer(&[json!([1]), json!([])]), FieldType::Array);
    }

    #[test]
    fn mixed_collapses_to_string() {
        assert_eq!(infer(&[json!(1), json!("x")]), FieldType::String);
        assert_eq!(infer(&[json!([1]), json!({"a": 1})]), FieldType::String);
    }

    #[test]
    fn only_first_ten_samples_count() {
        let mut values: Vec<Value> = (0..SAMPLE_LIMIT).map(|i| json!(i)).collect();
        values.push(json!("not a number"));
        assert_eq!(infer(&values), FieldType::Number);
    }

    #[test]
    fn classify_single_values() {
        assert_eq!(FieldType::of(&json!(null)), FieldType::Null);
        assert_eq!(FieldType::of(&json!([1])), FieldType::Array);
        assert_eq!(FieldType::of(&json!(false)), FieldType::Boolean);
        assert_eq!(FieldType::of(&json!(4)), FieldType::Number);
        assert_eq!(FieldType::of(&json!({})), FieldType::Object);
        assert_eq!(FieldType::of(&json!("2024-05-01")), FieldType::Date);
        assert_eq!(FieldType::of(&json!("hello")), FieldType::String);
    }

    #[test]
    fn type_names() {
        assert_eq!(FieldType::Number.to_string(), "number");
        assert_eq!(FieldType::parse("Boolean"), FieldType::Boolean);
        assert_eq!(FieldType::parse("whatever"), FieldType::String);
        assert_eq!(
            serde_json::to_value(FieldType::Date).unwrap(),
            json!("date")
        );
    }
}
