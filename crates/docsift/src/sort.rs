//! Multi-key stable sorting.
//!
//! A sort configuration is an ordered list of [`SortKey`]s. Keys without a
//! declared type are resolved against the document collection with
//! [`infer_field_type`] before sorting, producing [`ResolvedSortKey`]s.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::compare::{compare, Dir};
use crate::document::Seekable;
use crate::infer::{infer_field_type, FieldType};

/// One entry of a sort configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Field name or dot-separated path.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: Dir,
    /// Declared type; inferred from the documents when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

impl SortKey {
    /// Creates a sort key with the given direction and no declared type.
    pub fn new(field: impl Into<String>, direction: Dir) -> Self {
        SortKey {
            field: field.into(),
            direction,
            field_type: None,
        }
    }

    /// Creates an ascending sort key.
    pub fn asc(field: impl Into<String>) -> Self {
        SortKey::new(field, Dir::Asc)
    }

    /// Creates a descending sort key.
    pub fn desc(field: impl Into<String>) -> Self {
        SortKey::new(field, Dir::Desc)
    }

    /// Sets the declared type.
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Resolves the type, inferring it from `documents` when undeclared.
    pub fn resolve<T: Seekable>(&self, documents: &[T]) -> ResolvedSortKey {
        ResolvedSortKey {
            field: self.field.clone(),
            direction: self.direction,
            field_type: self
                .field_type
                .unwrap_or_else(|| infer_field_type(documents, &self.field)),
        }
    }
}

/// A sort key whose type is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSortKey {
    pub field: String,
    pub direction: Dir,
    pub field_type: FieldType,
}

impl ResolvedSortKey {
    /// Creates a resolved key.
    pub fn new(field: impl Into<String>, direction: Dir, field_type: FieldType) -> Self {
        ResolvedSortKey {
            field: field.into(),
            direction,
            field_type,
        }
    }

    /// Compares two documents on this key, direction applied.
    pub fn compare<T: Seekable>(&self, a: &T, b: &T) -> Ordering {
        let ordering = compare(a.seek(&self.field), b.seek(&self.field), self.field_type);
        self.direction.apply(ordering)
    }
}

/// Resolves every key with a non-empty field name.
///
/// Keys with an empty field (an unfinished picker row) are dropped; they
/// would compare every document as equal anyway.
pub fn resolve_sort_keys<T: Seekable>(documents: &[T], keys: &[SortKey]) -> Vec<ResolvedSortKey> {
    keys.iter()
        .filter(|key| !key.field.is_empty())
        .map(|key| key.resolve(documents))
        .collect()
}

/// Compares two documents on a list of keys.
///
/// The first key that does not tie decides; if all tie the result is
/// `Equal`.
pub fn compare_by_keys<T: Seekable>(a: &T, b: &T, keys: &[ResolvedSortKey]) -> Ordering {
    for key in keys {
        let ordering = key.compare(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Sorts references in place. Stable: ties keep their current order.
pub fn sort_refs<T: Seekable>(items: &mut [&T], keys: &[ResolvedSortKey]) {
    if keys.is_empty() {
        return;
    }
    items.sort_by(|a, b| compare_by_keys(*a, *b, keys));
}

/// Returns the documents ordered by `keys`, leaving the input untouched.
///
/// The sort is stable, and an empty key list returns the input order.
pub fn sort_documents<'a, T: Seekable>(documents: &'a [T], keys: &[ResolvedSortKey]) -> Vec<&'a T> {
    let mut ordered: Vec<&'a T> = documents.iter().collect();
    sort_refs(&mut ordered, keys);
    ordered
}

/// Adds `field` as an ascending key, or flips its direction if present.
pub fn toggle_sort(keys: &mut Vec<SortKey>, field: &str) {
    match keys.iter_mut().find(|key| key.field == field) {
        Some(key) => key.direction = key.direction.flip(),
        None => keys.push(SortKey::asc(field)),
    }
}

/// Swaps the key at `index` with its neighbour. Out-of-range moves are ignored.
pub fn move_sort_key(keys: &mut [SortKey], index: usize, up: bool) {
    let target = if up {
        index.checked_sub(1)
    } else {
        index.checked_add(1)
    };
    if let Some(target) = target.filter(|&t| t < keys.len() && index < keys.len()) {
        keys.swap(index, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn ids(docs: &[&Value]) -> Vec<i64> {
        docs.iter().map(|d| d["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn stable_on_ties() {
        let docs = vec![
            json!({"id": 1, "age": 30}),
            json!({"id": 2, "age": 30}),
            json!({"id": 3, "age": 20}),
        ];
        let keys = vec![ResolvedSortKey::new("age", Dir::Asc, FieldType::Number)];
        assert_eq!(ids(&sort_documents(&docs, &keys)), vec![3, 1, 2]);
    }

    #[test]
    fn descending_keeps_ties_stable() {
        let docs = vec![
            json!({"id": 1, "age": 30}),
            json!({"id": 2, "age": 20}),
            json!({"id": 3, "age": 30}),
        ];
        let keys = vec![ResolvedSortKey::new("age", Dir::Desc, FieldType::Number)];
        assert_eq!(ids(&sort_documents(&docs, &keys)), vec![1, 3, 2]);
    }

    #[test]
    fn later_keys_break_ties() {
        let docs = vec![
            json!({"id": 1, "team": "b", "score": 5}),
            json!({"id": 2, "team": "a", "score": 1}),
            json!({"id": 3, "team": "b", "score": 9}),
            json!({"id": 4, "team": "a", "score": 7}),
        ];
        let keys = vec![
            ResolvedSortKey::new("team", Dir::Asc, FieldType::String),
            ResolvedSortKey::new("score", Dir::Desc, FieldType::Number),
        ];
        assert_eq!(ids(&sort_documents(&docs, &keys)), vec![4, 2, 3, 1]);
    }

    #[test]
    fn empty_keys_keep_order() {
        let docs = vec![json!({"id": 2}), json!({"id": 1})];
        assert_eq!(ids(&sort_documents(&docs, &[])), vec![2, 1]);
    }

    #[test]
    fn missing_values_sort_first() {
        let docs = vec![json!({"id": 1, "n": 3}), json!({"id": 2}), json!({"id": 3, "n": null})];
        let keys = vec![ResolvedSortKey::new("n", Dir::Asc, FieldType::Number)];
        assert_eq!(ids(&sort_documents(&docs, &keys)), vec![2, 3, 1]);
    }

    #[test]
    fn nested_paths() {
        let docs = vec![
            json!({"id": 1, "user": {"name": "zoe"}}),
            json!({"id": 2, "user": {"name": "Adam"}}),
        ];
        let keys = vec![ResolvedSortKey::new("user.name", Dir::Asc, FieldType::String)];
        assert_eq!(ids(&sort_documents(&docs, &keys)), vec![2, 1]);
    }

    #[test]
    fn resolve_infers_missing_types() {
        let docs = vec![json!({"n": "10"}), json!({"n": 9})];
        let resolved = resolve_sort_keys(&docs, &[SortKey::asc("n"), SortKey::desc("")]);
        assert_eq!(resolved, vec![ResolvedSortKey::new("n", Dir::Asc, FieldType::Number)]);

        let declared = SortKey::asc("n").with_type(FieldType::String).resolve(&docs);
        assert_eq!(declared.field_type, FieldType::String);
    }

    #[test]
    fn inferred_numbers_sort_numerically() {
        let docs = vec![json!({"id": 1, "n": "10"}), json!({"id": 2, "n": 9})];
        let keys = resolve_sort_keys(&docs, &[SortKey::asc("n")]);
        assert_eq!(ids(&sort_documents(&docs, &keys)), vec![2, 1]);
    }

    #[test]
    fn toggle_and_move() {
        let mut keys = vec![SortKey::asc("a")];
        toggle_sort(&mut keys, "a");
        assert_eq!(keys[0].direction, Dir::Desc);
        toggle_sort(&mut keys, "b");
        assert_eq!(keys[1], SortKey::asc("b"));

        move_sort_key(&mut keys, 1, true);
        assert_eq!(keys[0].field, "b");
        move_sort_key(&mut keys, 0, true);
        assert_eq!(keys[0].field, "b");
        move_sort_key(&mut keys, 1, false);
        assert_eq!(keys[1].field, "a");
    }

    #[test]
    fn serde_shape() {
        let key: SortKey = serde_json::from_value(json!({"field": "age"})).unwrap();
        assert_eq!(key, SortKey::asc("age"));

        let typed = SortKey::desc("age").with_type(FieldType::Number);
        assert_eq!(
            serde_json::to_value(&typed).unwrap(),
            json!({"field": "age", "direction": "desc", "type": "number"})
        );
    }
}
