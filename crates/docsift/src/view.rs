//! The document-list pipeline: filter, sort, paginate.
//!
//! A [`View`] is the configuration a document browser keeps between
//! requests. It is plain serde data, so it can be saved and restored as
//! JSON; [`View::apply`] runs it over a collection.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::document::Seekable;
use crate::error::Result;
use crate::filter::{apply_filters, FilterCondition, Logic};
use crate::page::{paginate, PageInfo, DEFAULT_PAGE_SIZE};
use crate::sort::{resolve_sort_keys, sort_refs, toggle_sort, SortKey};

fn first_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Filter, sort and page settings for a document list.
///
/// # Example
///
/// ```
/// use docsift::{FieldType, FilterCondition, SortKey, View};
/// use serde_json::json;
///
/// let docs = vec![
///     json!({"name": "b", "age": 40}),
///     json!({"name": "a", "age": 35}),
///     json!({"name": "c", "age": 20}),
/// ];
///
/// let view = View::new()
///     .filter(FilterCondition::new("age", "greaterThan", "30").with_type(FieldType::Number))
///     .sort(SortKey::asc("name"))
///     .page_size(1);
///
/// let page = view.apply(&docs).unwrap();
/// assert_eq!(page.items, vec![&docs[1]]);
/// assert_eq!(page.info.total_items, 2);
/// assert_eq!(page.info.total_pages, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// Filter conditions, combined by `logic`.
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    #[serde(default)]
    pub logic: Logic,
    /// Sort keys; earlier keys take precedence.
    #[serde(default)]
    pub sort: Vec<SortKey>,
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for View {
    fn default() -> Self {
        View {
            filters: Vec::new(),
            logic: Logic::And,
            sort: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a processed collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPage<'a, T> {
    /// Documents on this page, in view order.
    pub items: Vec<&'a T>,
    pub info: PageInfo,
}

impl View {
    /// No filters or sort keys, first page, default page size.
    pub fn new() -> Self {
        View::default()
    }

    /// Parses a saved view.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Renders the view as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Adds a filter condition and returns to the first page.
    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self.page = 1;
        self
    }

    /// Sets how filters combine and returns to the first page.
    pub fn logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self.page = 1;
        self
    }

    /// Appends a sort key and returns to the first page.
    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self.page = 1;
        self
    }

    /// Selects a page.
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Sets the page size and returns to the first page.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self.page = 1;
        self
    }

    /// Toggles a quick sort on `field` and returns to the first page.
    pub fn toggle_sort(&mut self, field: &str) {
        toggle_sort(&mut self.sort, field);
        self.page = 1;
    }

    /// Removes every filter and sort key.
    pub fn clear(&mut self) {
        self.filters.clear();
        self.sort.clear();
        self.page = 1;
    }

    /// Filters and sorts `documents`, without paginating.
    ///
    /// Sort keys without a declared type are resolved against the whole
    /// collection, not just the filtered rows.
    pub fn process<'a, T: Seekable>(&self, documents: &'a [T]) -> Vec<&'a T> {
        let mut rows = apply_filters(documents, &self.filters, self.logic);
        let keys = resolve_sort_keys(documents, &self.sort);
        sort_refs(&mut rows, &keys);
        tracing::debug!(
            total = documents.len(),
            matched = rows.len(),
            sort_keys = keys.len(),
            "processed view"
        );
        rows
    }

    /// Filters, sorts and returns the configured page.
    pub fn apply<'a, T: Seekable>(&self, documents: &'a [T]) -> Result<ViewPage<'a, T>> {
        let rows = self.process(documents);
        let info = PageInfo::new(self.page, self.page_size, rows.len())?;
        let items = paginate(&rows, self.page, self.page_size)?.to_vec();
        Ok(ViewPage { items, info })
    }
}

/// Serializes a filter list for storage.
pub fn filters_to_json(filters: &[FilterCondition]) -> Result<String> {
    Ok(serde_json::to_string(filters)?)
}

/// Restores a stored filter list. Unreadable input yields an empty list.
pub fn filters_from_json(text: &str) -> Vec<FilterCondition> {
    load_list(text, "filters")
}

/// Serializes a sort configuration for storage.
pub fn sort_to_json(keys: &[SortKey]) -> Result<String> {
    Ok(serde_json::to_string(keys)?)
}

/// Restores a stored sort configuration. Unreadable input yields an empty
/// list.
pub fn sort_from_json(text: &str) -> Vec<SortKey> {
    load_list(text, "sort")
}

fn load_list<T: DeserializeOwned>(text: &str, what: &str) -> Vec<T> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(text) {
        Ok(list) => list,
        Err(err) => {
            tracing::debug!(error = %err, "discarding unreadable saved {what}");
            Vec::new()
        }
    }
}
