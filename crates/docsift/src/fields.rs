//! Field discovery.

use std::collections::BTreeSet;

use crate::document::Seekable;

/// Prefix marking store-internal fields such as `_id` and `_rev`.
pub const INTERNAL_PREFIX: &str = "_";

/// Returns `true` for store-internal field names.
pub fn is_internal_field(name: &str) -> bool {
    name.starts_with(INTERNAL_PREFIX)
}

/// Collects the distinct top-level field names across `documents`, sorted.
///
/// Only the top level is scanned; nested objects contribute their parent
/// key, not their own keys.
///
/// ```
/// use docsift::extract_fields;
/// use serde_json::json;
///
/// let docs = vec![json!({"b": 1, "a": 2}), json!({"c": 3, "a": 4})];
/// assert_eq!(extract_fields(&docs), vec!["a", "b", "c"]);
/// ```
pub fn extract_fields<T: Seekable>(documents: &[T]) -> Vec<String> {
    extract_fields_where(documents, |_| true)
}

/// Like [`extract_fields`], keeping only names accepted by `keep`.
pub fn extract_fields_where<T, F>(documents: &[T], keep: F) -> Vec<String>
where
    T: Seekable,
    F: Fn(&str) -> bool,
{
    let mut names: BTreeSet<String> = BTreeSet::new();
    for doc in documents {
        for name in doc.field_names() {
            if keep(name) && !names.contains(name) {
                names.insert(name.to_owned());
            }
        }
    }
    names.into_iter().collect()
}

/// Field names suitable for filter and sort pickers: internal fields removed.
pub fn filterable_fields<T: Seekable>(documents: &[T]) -> Vec<String> {
    extract_fields_where(documents, |name| !is_internal_field(name))
}
