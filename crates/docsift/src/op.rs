//! Filter operators.
//!
//! The [`FilterOp`] enum lists every operator the filter evaluator knows,
//! together with the short and Mango-style aliases accepted on input.
//! Operator names that are not recognized are kept in
//! [`FilterOp::Unknown`] so saved configurations round-trip unchanged.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::infer::FieldType;

/// Comparison operator for a filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOp {
    /// Strict equality (`=`, `$eq`).
    Equals,
    /// Negated strict equality (`!=`, `$ne`).
    NotEquals,
    /// Case-insensitive substring.
    Contains,
    /// Negated case-insensitive substring.
    NotContains,
    /// Case-insensitive prefix.
    StartsWith,
    /// Case-insensitive suffix.
    EndsWith,
    /// `>`, `$gt`.
    GreaterThan,
    /// `>=`, `$gte`.
    GreaterThanOrEqual,
    /// `<`, `$lt`.
    LessThan,
    /// `<=`, `$lte`.
    LessThanOrEqual,
    /// Inclusive `[min, max]` range.
    InRange,
    /// Membership in a list (`$in`).
    In,
    /// Non-membership in a list (`$nin`).
    NotIn,
    /// Value is null, missing or the empty string.
    IsNull,
    /// Same test as `IsNull`.
    IsEmpty,
    /// Negation of `IsNull`.
    IsNotNull,
    /// Same test as `IsNotNull`.
    IsNotEmpty,
    /// Case-insensitive regular expression (`$regex`).
    Regex,
    /// An operator name this crate does not know.
    Unknown(String),
}

/// All known operators, in picker order.
pub const FILTER_OPERATORS: &[FilterOp] = &[
    FilterOp::Equals,
    FilterOp::NotEquals,
    FilterOp::Contains,
    FilterOp::NotContains,
    FilterOp::StartsWith,
    FilterOp::EndsWith,
    FilterOp::GreaterThan,
    FilterOp::GreaterThanOrEqual,
    FilterOp::LessThan,
    FilterOp::LessThanOrEqual,
    FilterOp::InRange,
    FilterOp::In,
    FilterOp::NotIn,
    FilterOp::IsNull,
    FilterOp::IsNotNull,
    FilterOp::Regex,
];

impl FilterOp {
    /// Parses an operator name or alias. Never fails.
    pub fn parse(name: &str) -> FilterOp {
        match name {
            "equals" | "=" | "$eq" => FilterOp::Equals,
            "notEquals" | "!=" | "$ne" => FilterOp::NotEquals,
            "contains" => FilterOp::Contains,
            "notContains" => FilterOp::NotContains,
            "startsWith" => FilterOp::StartsWith,
            "endsWith" => FilterOp::EndsWith,
            "greaterThan" | ">" | "$gt" => FilterOp::GreaterThan,
            "greaterThanOrEqual" | ">=" | "$gte" => FilterOp::GreaterThanOrEqual,
            "lessThan" | "<" | "$lt" => FilterOp::LessThan,
            "lessThanOrEqual" | "<=" | "$lte" => FilterOp::LessThanOrEqual,
            "inRange" => FilterOp::InRange,
            "in" | "$in" => FilterOp::In,
            "notIn" | "$nin" => FilterOp::NotIn,
            "isNull" => FilterOp::IsNull,
            "isEmpty" => FilterOp::IsEmpty,
            "isNotNull" => FilterOp::IsNotNull,
            "isNotEmpty" => FilterOp::IsNotEmpty,
            "regex" | "$regex" => FilterOp::Regex,
            other => FilterOp::Unknown(other.to_owned()),
        }
    }

    /// Returns the canonical name of this operator.
    pub fn as_str(&self) -> &str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::NotEquals => "notEquals",
            FilterOp::Contains => "contains",
            FilterOp::NotContains => "notContains",
            FilterOp::StartsWith => "startsWith",
            FilterOp::EndsWith => "endsWith",
            FilterOp::GreaterThan => "greaterThan",
            FilterOp::GreaterThanOrEqual => "greaterThanOrEqual",
            FilterOp::LessThan => "lessThan",
            FilterOp::LessThanOrEqual => "lessThanOrEqual",
            FilterOp::InRange => "inRange",
            FilterOp::In => "in",
            FilterOp::NotIn => "notIn",
            FilterOp::IsNull => "isNull",
            FilterOp::IsEmpty => "isEmpty",
            FilterOp::IsNotNull => "isNotNull",
            FilterOp::IsNotEmpty => "isNotEmpty",
            FilterOp::Regex => "regex",
            FilterOp::Unknown(name) => name,
        }
    }

    /// Returns `true` for the operators that hold on null values.
    pub fn is_null_check(&self) -> bool {
        matches!(self, FilterOp::IsNull | FilterOp::IsEmpty)
    }

    /// Returns `true` unless this is [`FilterOp::Unknown`].
    pub fn is_known(&self) -> bool {
        !matches!(self, FilterOp::Unknown(_))
    }

    /// Returns `true` if a picker should offer this operator for `field_type`.
    ///
    /// The evaluator itself does not enforce this table.
    pub fn supports(&self, field_type: FieldType) -> bool {
        use FieldType::*;
        match self {
            FilterOp::Equals | FilterOp::NotEquals => {
                matches!(field_type, String | Number | Boolean | Date)
            }
            FilterOp::Contains
            | FilterOp::NotContains
            | FilterOp::StartsWith
            | FilterOp::EndsWith
            | FilterOp::Regex => field_type == String,
            FilterOp::GreaterThan
            | FilterOp::GreaterThanOrEqual
            | FilterOp::LessThan
            | FilterOp::LessThanOrEqual
            | FilterOp::InRange => matches!(field_type, Number | Date),
            FilterOp::In | FilterOp::NotIn => matches!(field_type, String | Number),
            FilterOp::IsNull | FilterOp::IsEmpty | FilterOp::IsNotNull | FilterOp::IsNotEmpty => {
                matches!(field_type, String | Number | Boolean | Date | Array)
            }
            FilterOp::Unknown(_) => false,
        }
    }

    /// Evaluates a relational operator given an ordering result.
    ///
    /// Non-relational operators return `false`.
    pub fn eval_ordering(&self, ordering: Ordering) -> bool {
        match self {
            FilterOp::GreaterThan => ordering == Ordering::Greater,
            FilterOp::GreaterThanOrEqual => ordering != Ordering::Less,
            FilterOp::LessThan => ordering == Ordering::Less,
            FilterOp::LessThanOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }
}

/// Operators a picker should offer for a field type.
pub fn operators_for(field_type: FieldType) -> Vec<FilterOp> {
    FILTER_OPERATORS
        .iter()
        .filter(|op| op.supports(field_type))
        .cloned()
        .collect()
}

impl From<&str> for FilterOp {
    fn from(name: &str) -> Self {
        FilterOp::parse(name)
    }
}

impl From<String> for FilterOp {
    fn from(name: String) -> Self {
        match FilterOp::parse(&name) {
            FilterOp::Unknown(_) => FilterOp::Unknown(name),
            known => known,
        }
    }
}

impl From<FilterOp> for String {
    fn from(op: FilterOp) -> Self {
        match op {
            FilterOp::Unknown(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
