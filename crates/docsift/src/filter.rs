//! Filter evaluation.
//!
//! [`evaluate`] applies one operator to one field value. [`FilterCondition`]
//! binds an operator to a field and a typed value, and [`FilterSet`]
//! combines conditions with AND or OR logic over a collection.
//!
//! Bad input never raises an error here:
//!
//! - a condition with no field or no value constrains nothing;
//! - an unrecognized operator lets every document through (and logs one
//!   warning per condition when a set is applied);
//! - an invalid regular expression matches nothing.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::coerce::{coerce_date, coerce_number, coerce_string, parse_filter_value, split_list};
use crate::document::Seekable;
use crate::infer::FieldType;
use crate::op::FilterOp;

/// Evaluates a single predicate against a field value.
///
/// A missing or null field value satisfies only `isNull` / `isEmpty`. The
/// same holds when the filter value is missing, null or the empty string.
///
/// # Example
///
/// ```
/// use docsift::{evaluate, FilterOp};
/// use serde_json::json;
///
/// let value = json!("Hello World");
/// assert!(evaluate(Some(&value), &FilterOp::Contains, Some(&json!("WORLD"))));
/// assert!(!evaluate(Some(&json!("abc")), &FilterOp::Regex, Some(&json!("["))));
/// assert!(evaluate(None, &FilterOp::IsNull, Some(&json!("x"))));
/// ```
pub fn evaluate(field_value: Option<&Value>, op: &FilterOp, filter_value: Option<&Value>) -> bool {
    let value = match field_value {
        Some(v) if !v.is_null() => v,
        _ => return op.is_null_check(),
    };
    let filter = match filter_value {
        Some(f) if !is_blank(f) => f,
        _ => return op.is_null_check(),
    };

    match op {
        FilterOp::Equals => strict_eq(value, filter),
        FilterOp::NotEquals => !strict_eq(value, filter),
        FilterOp::Contains => text(value).contains(&text(filter)),
        FilterOp::NotContains => !text(value).contains(&text(filter)),
        FilterOp::StartsWith => text(value).starts_with(&text(filter)),
        FilterOp::EndsWith => text(value).ends_with(&text(filter)),
        FilterOp::GreaterThan
        | FilterOp::GreaterThanOrEqual
        | FilterOp::LessThan
        | FilterOp::LessThanOrEqual => {
            relational_cmp(value, filter).is_some_and(|ordering| op.eval_ordering(ordering))
        }
        FilterOp::InRange => match filter.as_array().map(Vec::as_slice) {
            Some([min, max]) => {
                relational_cmp(value, min).is_some_and(|o| o != Ordering::Less)
                    && relational_cmp(value, max).is_some_and(|o| o != Ordering::Greater)
            }
            _ => false,
        },
        FilterOp::In => filter
            .as_array()
            .is_some_and(|items| items.iter().any(|item| strict_eq(value, item))),
        FilterOp::NotIn => filter
            .as_array()
            .map_or(true, |items| !items.iter().any(|item| strict_eq(value, item))),
        FilterOp::IsNull | FilterOp::IsEmpty => is_blank(value),
        FilterOp::IsNotNull | FilterOp::IsNotEmpty => !is_blank(value),
        FilterOp::Regex => {
            let pattern = coerce_string(filter);
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(regex) => regex.is_match(&text(value)),
                Err(err) => {
                    tracing::debug!(%pattern, error = %err, "invalid filter pattern; no match");
                    false
                }
            }
        }
        FilterOp::Unknown(_) => true,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn text(value: &Value) -> String {
    coerce_string(value).to_lowercase()
}

/// Same type and same value. Numbers compare numerically, so `1` equals
/// `1.0`; arrays and objects compare structurally.
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => a == b,
        _ => false,
    }
}

/// Two strings compare lexically; anything else compares numerically when
/// both sides coerce to numbers.
fn relational_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => coerce_number(a)?.partial_cmp(&coerce_number(b)?),
    }
}

/// How a [`FilterSet`] combines its conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    /// Every condition must hold.
    #[default]
    #[serde(alias = "and")]
    And,
    /// At least one condition must hold.
    #[serde(alias = "or")]
    Or,
}

/// One filter row: field, operator, value and declared type.
///
/// `value` distinguishes "absent" (`None`, the condition constrains
/// nothing) from an explicit JSON null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Field name or dot-separated path.
    #[serde(default)]
    pub field: String,
    /// Operator to apply.
    pub operator: FilterOp,
    /// Raw comparison value as entered.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Declared field type, used to interpret `value`.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FilterCondition {
    /// Creates a `String`-typed condition.
    pub fn new(field: impl Into<String>, operator: impl Into<FilterOp>, value: impl Into<Value>) -> Self {
        FilterCondition {
            field: field.into(),
            operator: operator.into(),
            value: Some(value.into()),
            field_type: FieldType::String,
        }
    }

    /// Creates a condition without a value (for `isNull`-style operators
    /// or an unfinished row).
    pub fn unary(field: impl Into<String>, operator: impl Into<FilterOp>) -> Self {
        FilterCondition {
            field: field.into(),
            operator: operator.into(),
            value: None,
            field_type: FieldType::String,
        }
    }

    /// Sets the declared type.
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Returns `true` if this condition constrains nothing: it has no field
    /// or no value.
    pub fn is_vacuous(&self) -> bool {
        self.field.is_empty() || self.value.is_none()
    }

    /// Returns `true` if the row is filled in enough to count as active.
    pub fn is_active(&self) -> bool {
        !self.field.is_empty() && self.value.as_ref().is_some_and(|v| !is_blank(v))
    }

    /// The comparison value interpreted by the declared type.
    ///
    /// A comma-separated string given to `in` / `notIn` becomes a list
    /// before type conversion.
    pub fn filter_value(&self) -> Option<Value> {
        let raw = self.value.as_ref()?;
        let listed = match (&self.operator, raw) {
            (FilterOp::In | FilterOp::NotIn, Value::String(s)) if !s.is_empty() => {
                Value::Array(split_list(s).into_iter().map(Value::from).collect())
            }
            _ => raw.clone(),
        };
        Some(parse_filter_value(&listed, self.field_type))
    }

    /// Tests one document against this condition.
    pub fn matches<T: Seekable>(&self, document: &T) -> bool {
        if self.is_vacuous() {
            return true;
        }
        let filter_value = self.filter_value();
        let field_value = document.seek(&self.field);

        if self.field_type == FieldType::Date {
            let as_millis = field_value
                .filter(|v| !v.is_null())
                .map(|v| coerce_date(v).map(Value::from).unwrap_or_else(|| v.clone()));
            return evaluate(as_millis.as_ref(), &self.operator, filter_value.as_ref());
        }
        evaluate(field_value, &self.operator, filter_value.as_ref())
    }
}

/// A list of conditions combined with AND or OR.
///
/// # Example
///
/// ```
/// use docsift::{FilterCondition, FilterSet, FieldType};
/// use serde_json::json;
///
/// let docs = vec![
///     json!({"name": "Ada", "age": 36}),
///     json!({"name": "Linus", "age": 28}),
/// ];
///
/// let adults_over_30 = FilterSet::all()
///     .with(FilterCondition::new("age", "greaterThan", "30").with_type(FieldType::Number));
/// let matched = adults_over_30.apply(&docs);
/// assert_eq!(matched.len(), 1);
/// assert_eq!(matched[0]["name"], "Ada");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub logic: Logic,
}

impl FilterSet {
    /// Creates a set with the given conditions and logic.
    pub fn new(conditions: Vec<FilterCondition>, logic: Logic) -> Self {
        FilterSet { conditions, logic }
    }

    /// An empty AND set.
    pub fn all() -> Self {
        FilterSet::new(Vec::new(), Logic::And)
    }

    /// An empty OR set.
    pub fn any() -> Self {
        FilterSet::new(Vec::new(), Logic::Or)
    }

    /// Adds a condition.
    pub fn with(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Returns `true` if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of filled-in conditions.
    pub fn active_count(&self) -> usize {
        self.conditions.iter().filter(|c| c.is_active()).count()
    }

    /// Tests one document.
    pub fn matches<T: Seekable>(&self, document: &T) -> bool {
        matches_conditions(&self.conditions, self.logic, document)
    }

    /// Returns references to the matching documents, in input order.
    pub fn apply<'a, T: Seekable>(&self, documents: &'a [T]) -> Vec<&'a T> {
        apply_filters(documents, &self.conditions, self.logic)
    }

    /// Counts the matching documents.
    pub fn count<T: Seekable>(&self, documents: &[T]) -> usize {
        warn_unknown_operators(&self.conditions);
        documents.iter().filter(|doc| self.matches(*doc)).count()
    }

    /// Operators that were not recognized, among the conditions that
    /// constrain something.
    pub fn unknown_operators(&self) -> Vec<&str> {
        unknown_operators(&self.conditions)
    }
}

fn matches_conditions<T: Seekable>(conditions: &[FilterCondition], logic: Logic, document: &T) -> bool {
    if conditions.is_empty() {
        return true;
    }
    match logic {
        Logic::And => conditions.iter().all(|c| c.matches(document)),
        Logic::Or => conditions.iter().any(|c| c.matches(document)),
    }
}

fn unknown_operators(conditions: &[FilterCondition]) -> Vec<&str> {
    conditions
        .iter()
        .filter(|c| !c.is_vacuous())
        .filter_map(|c| match &c.operator {
            FilterOp::Unknown(name) => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

fn warn_unknown_operators(conditions: &[FilterCondition]) {
    for name in unknown_operators(conditions) {
        tracing::warn!(operator = %name, "unrecognized filter operator; passing documents through");
    }
}

/// Filters `documents` by `conditions` combined with `logic`.
pub fn apply_filters<'a, T: Seekable>(
    documents: &'a [T],
    conditions: &[FilterCondition],
    logic: Logic,
) -> Vec<&'a T> {
    warn_unknown_operators(conditions);
    documents
        .iter()
        .filter(|doc| matches_conditions(conditions, logic, *doc))
        .collect()
}
