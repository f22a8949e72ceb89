//! Type-aware value comparison.
//!
//! [`compare`] orders two field values under a declared [`FieldType`]. It is
//! a total order for every type, so it can drive a stable sort directly.

use std::cmp::Ordering;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{coerce_date, coerce_number, coerce_string, is_truthy};
use crate::infer::FieldType;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    #[serde(alias = "ascending", alias = "ASC", alias = "ASCENDING")]
    Asc,
    /// Descending order (largest first).
    #[serde(alias = "descending", alias = "DESC", alias = "DESCENDING")]
    Desc,
}

impl Dir {
    /// Normalizes a direction name.
    ///
    /// `asc` and `ascending` (any case) are ascending; anything else is
    /// descending.
    pub fn parse(name: &str) -> Dir {
        match name.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Dir::Asc,
            _ => Dir::Desc,
        }
    }

    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Returns the opposite direction.
    pub fn flip(self) -> Dir {
        match self {
            Dir::Asc => Dir::Desc,
            Dir::Desc => Dir::Asc,
        }
    }

    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the store token for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compares two field values under a declared type.
///
/// Missing and null values sort before everything else and equal each
/// other. For the non-null cases:
///
/// - `Number` and `Date` coerce both sides; a value that does not coerce
///   sorts before every value that does, and ties with other such values.
/// - `Boolean` compares truthiness, false before true.
/// - Every other type compares display text case-insensitively, with
///   accents folded, falling back to the lower-cased text to break ties.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use docsift::{compare, FieldType};
/// use serde_json::json;
///
/// let null = json!(null);
/// let five = json!(5);
/// assert_eq!(compare(Some(&null), Some(&five), FieldType::Number), Ordering::Less);
/// assert_eq!(compare(Some(&five), None, FieldType::Number), Ordering::Greater);
/// assert_eq!(compare(None, Some(&null), FieldType::Number), Ordering::Equal);
/// ```
pub fn compare(a: Option<&Value>, b: Option<&Value>, field_type: FieldType) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match field_type {
            FieldType::Number => compare_coerced(coerce_number(a), coerce_number(b)),
            FieldType::Date => compare_coerced(coerce_date(a), coerce_date(b)),
            FieldType::Boolean => is_truthy(a).cmp(&is_truthy(b)),
            _ => compare_text(&coerce_string(a), &coerce_string(b)),
        },
    }
}

fn compare_coerced<N: PartialOrd>(a: Option<N>, b: Option<N>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Case-insensitive, accent-folding text comparison.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let folded_a = deunicode(a).to_lowercase();
    let folded_b = deunicode(b).to_lowercase();
    folded_a
        .cmp(&folded_b)
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmp(a: Value, b: Value, ty: FieldType) -> Ordering {
        compare(Some(&a), Some(&b), ty)
    }

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn dir_parse_and_serde() {
        assert_eq!(Dir::parse("ASCENDING"), Dir::Asc);
        assert_eq!(Dir::parse("asc"), Dir::Asc);
        assert_eq!(Dir::parse("Descending"), Dir::Desc);
        assert_eq!(Dir::parse("sideways"), Dir::Desc);
        assert_eq!(Dir::Asc.flip(), Dir::Desc);

        let dir: Dir = serde_json::from_str("\"descending\"").unwrap();
        assert_eq!(dir, Dir::Desc);
        assert_eq!(serde_json::to_string(&Dir::Asc).unwrap(), "\"asc\"");
    }

    #[test]
    fn nulls_sort_first() {
        let null = json!(null);
        let five = json!(5);
        assert_eq!(compare(Some(&null), Some(&five), FieldType::Number), Ordering::Less);
        assert_eq!(compare(Some(&five), Some(&null), FieldType::Number), Ordering::Greater);
        assert_eq!(compare(Some(&null), Some(&null), FieldType::Number), Ordering::Equal);
        assert_eq!(compare(None, Some(&null), FieldType::String), Ordering::Equal);
        assert_eq!(compare(None, Some(&five), FieldType::String), Ordering::Less);
    }

    #[test]
    fn numbers() {
        assert_eq!(cmp(json!(2), json!(10), FieldType::Number), Ordering::Less);
        assert_eq!(cmp(json!("2"), json!(10), FieldType::Number), Ordering::Less);
        assert_eq!(cmp(json!(2.5), json!("2.5"), FieldType::Number), Ordering::Equal);
    }

    #[test]
    fn non_numeric_sorts_before_numbers() {
        assert_eq!(cmp(json!("abc"), json!(-100), FieldType::Number), Ordering::Less);
        assert_eq!(cmp(json!(-100), json!("abc"), FieldType::Number), Ordering::Greater);
        assert_eq!(cmp(json!("abc"), json!("xyz"), FieldType::Number), Ordering::Equal);
    }

    #[test]
    fn dates() {
        assert_eq!(
            cmp(json!("2024-01-02"), json!("2023-12-31T23:59:59Z"), FieldType::Date),
            Ordering::Greater
        );
        assert_eq!(
            cmp(json!("garbage"), json!("2000-01-01"), FieldType::Date),
            Ordering::Less
        );
    }

    #[test]
    fn booleans() {
        assert_eq!(cmp(json!(false), json!(true), FieldType::Boolean), Ordering::Less);
        assert_eq!(cmp(json!(true), json!(true), FieldType::Boolean), Ordering::Equal);
    }

    #[test]
    fn strings_ignore_case_and_accents() {
        assert_eq!(cmp(json!("apple"), json!("Banana"), FieldType::String), Ordering::Less);
        assert_eq!(cmp(json!("Apple"), json!("apple"), FieldType::String), Ordering::Equal);
        assert_eq!(cmp(json!("école"), json!("ecrire"), FieldType::String), Ordering::Less);
        assert_eq!(cmp(json!(10), json!(9), FieldType::String), Ordering::Less);
    }

    #[test]
    fn untyped_kinds_compare_as_text() {
        assert_eq!(cmp(json!([1, 2]), json!([1, 3]), FieldType::Array), Ordering::Less);
        assert_eq!(
            cmp(json!({"a": 1}), json!({"b": 2}), FieldType::Object),
            Ordering::Equal
        );
    }
}
