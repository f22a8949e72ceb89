//! Docsift - filtering, sorting and query building for schemaless JSON documents.
//!
//! Docsift works on collections of documents that have already been fetched
//! from a document store. It provides:
//!
//! - Field discovery across a collection
//! - Field type inference from sample values
//! - Type-aware comparison and stable multi-key sorting
//! - Filter conditions with sixteen operators, combined with AND or OR
//! - Pagination with page metadata
//! - Mango-style query descriptors built from query-builder rows
//!
//! # Quick Start
//!
//! ```rust
//! use docsift::{extract_fields, FieldType, FilterCondition, Logic, SortKey, View};
//! use serde_json::json;
//!
//! let docs = vec![
//!     json!({"_id": "a", "name": "Write docs", "priority": 3, "done": false}),
//!     json!({"_id": "b", "name": "Fix bug", "priority": 5, "done": false}),
//!     json!({"_id": "c", "name": "Old task", "priority": 1, "done": true}),
//! ];
//!
//! assert_eq!(extract_fields(&docs), vec!["_id", "done", "name", "priority"]);
//!
//! let view = View::new()
//!     .filter(FilterCondition::new("priority", "greaterThanOrEqual", "3").with_type(FieldType::Number))
//!     .filter(FilterCondition::new("done", "equals", "false").with_type(FieldType::Boolean))
//!     .logic(Logic::And)
//!     .sort(SortKey::desc("priority"));
//!
//! let page = view.apply(&docs).unwrap();
//! assert_eq!(page.items.len(), 2);
//! assert_eq!(page.items[0]["name"], "Fix bug");
//! ```
//!
//! # Null and Failure Semantics
//!
//! Nothing in the filter or query path fails on bad input:
//!
//! ```text
//! missing/null field value      -> only isNull / isEmpty match
//! blank filter value            -> only isNull / isEmpty match
//! condition without field/value -> matches everything
//! unknown operator              -> matches everything (logged)
//! invalid regex                 -> matches nothing
//! ```
//!
//! When sorting, missing and null values come first in ascending order, and
//! values that cannot be read as the declared type come right after them.
//!
//! # Field Types and Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `equals`, `notEquals`, `contains`, `notContains`, `startsWith`, `endsWith`, `in`, `notIn`, `regex` |
//! | Number | `equals`, `notEquals`, `greaterThan`, `greaterThanOrEqual`, `lessThan`, `lessThanOrEqual`, `inRange`, `in`, `notIn` |
//! | Date | `equals`, `notEquals`, `greaterThan`, `greaterThanOrEqual`, `lessThan`, `lessThanOrEqual`, `inRange` |
//! | Boolean | `equals`, `notEquals` |
//!
//! Every type except `Object` and `Null` also offers `isNull` and
//! `isNotNull`.

mod coerce;
mod compare;
mod document;
mod error;
mod fields;
mod filter;
mod infer;
mod op;
mod page;
mod saved;
mod selector;
mod sort;
mod view;

pub use coerce::{
    coerce_boolean, coerce_date, coerce_integer, coerce_number, coerce_string, parse_date,
    parse_filter_value,
};
pub use compare::{compare, compare_text, Dir};
pub use document::{load_documents, Document, Seekable, ID_FIELD};
pub use error::{Result, SeekerError};
pub use fields::{extract_fields, extract_fields_where, filterable_fields, is_internal_field};
pub use filter::{apply_filters, evaluate, FilterCondition, FilterSet, Logic};
pub use infer::{infer_field_type, infer_type, FieldType, SAMPLE_LIMIT};
pub use op::{operators_for, FilterOp, FILTER_OPERATORS};
pub use page::{paginate, PageInfo, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
pub use saved::{QueryResults, SavedQueries, SavedQuery};
pub use selector::{
    build_query, Limit, QueryCondition, QueryDescriptor, QueryOptions, QuerySort, SortEntry,
    DEFAULT_LIMIT, SELECTOR_OPERATORS, UNBOUNDED_LIMIT,
};
pub use sort::{
    compare_by_keys, move_sort_key, resolve_sort_keys, sort_documents, sort_refs, toggle_sort,
    ResolvedSortKey, SortKey,
};
pub use view::{
    filters_from_json, filters_to_json, sort_from_json, sort_to_json, View, ViewPage,
};
