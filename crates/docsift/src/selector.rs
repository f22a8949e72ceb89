//! Mango-style query descriptors.
//!
//! [`build_query`] turns the rows of a visual query builder into a
//! [`QueryDescriptor`] that a document store can execute. Each row is a
//! [`QueryCondition`] whose value is the raw text the user typed; the
//! operator decides how that text is interpreted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{number_value, parse_bool, parse_integer, parse_number, split_list};
use crate::compare::Dir;
use crate::error::Result;

/// Default result limit.
pub const DEFAULT_LIMIT: u64 = 25;

/// Limit sent when the user asks for no limit. Stores still require a
/// concrete number.
pub const UNBOUNDED_LIMIT: u64 = 1_000_000;

/// Selector operators offered by the query builder, with their labels.
pub const SELECTOR_OPERATORS: &[(&str, &str)] = &[
    ("$eq", "equals"),
    ("$ne", "not equals"),
    ("$gt", "greater than"),
    ("$gte", "greater than or equal"),
    ("$lt", "less than"),
    ("$lte", "less than or equal"),
    ("$in", "in (comma separated)"),
    ("$nin", "not in (comma separated)"),
    ("$all", "all (comma separated)"),
    ("$size", "size (array length)"),
    ("$mod", "modulo (divisor, remainder)"),
    ("$regex", "regex"),
    ("$exists", "exists (true/false)"),
    ("$type", "type"),
];

fn default_operator() -> String {
    "$eq".to_owned()
}

/// One query-builder row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCondition {
    /// Field name the row constrains.
    #[serde(default)]
    pub field: String,
    /// Selector operator such as `$gt`; defaults to `$eq`.
    #[serde(default = "default_operator")]
    pub operator: String,
    /// Raw text as typed; interpreted by the operator.
    #[serde(default)]
    pub value: String,
}

impl QueryCondition {
    /// Creates a row.
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        QueryCondition {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Translates this row into a selector entry, or `None` if the row is
    /// incomplete or its value does not fit the operator.
    pub fn to_predicate(&self) -> Option<Value> {
        if self.field.is_empty() || self.value.is_empty() {
            return None;
        }
        let op = self.operator.as_str();
        let value = self.value.as_str();
        match op {
            "$eq" => Some(Value::String(value.to_owned())),
            "$exists" => Some(wrap(op, Value::Bool(parse_bool(value)))),
            "$in" | "$nin" | "$all" => {
                let tokens = split_list(value).into_iter().map(numeric_or_text).collect();
                Some(wrap(op, Value::Array(tokens)))
            }
            "$mod" => {
                let parts = split_list(value)
                    .into_iter()
                    .map(parse_integer)
                    .collect::<Option<Vec<i64>>>()?;
                match parts.as_slice() {
                    [divisor, remainder] => {
                        Some(wrap(op, Value::from(vec![*divisor, *remainder])))
                    }
                    _ => None,
                }
            }
            "$size" => parse_integer(value).map(|n| wrap(op, Value::from(n))),
            _ => Some(wrap(op, numeric_or_text(value))),
        }
    }
}

fn wrap(op: &str, value: Value) -> Value {
    let mut predicate = Map::new();
    predicate.insert(op.to_owned(), value);
    Value::Object(predicate)
}

fn numeric_or_text(token: &str) -> Value {
    parse_number(token)
        .map(number_value)
        .unwrap_or_else(|| Value::String(token.to_owned()))
}

/// Result limit for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most this many documents.
    Bounded(u64),
    /// No limit; sent as [`UNBOUNDED_LIMIT`].
    Unbounded,
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Bounded(DEFAULT_LIMIT)
    }
}

impl Limit {
    /// The concrete number sent to the store.
    pub fn resolve(self) -> u64 {
        match self {
            Limit::Bounded(n) => n,
            Limit::Unbounded => UNBOUNDED_LIMIT,
        }
    }
}

/// Single-field ordering chosen in the query builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySort {
    /// Field to order by.
    pub field: String,
    /// Free-form direction text; see [`Dir::parse`].
    #[serde(default)]
    pub direction: String,
}

/// Projection, ordering and limit settings for [`build_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Projection; empty returns whole documents.
    pub fields: Vec<String>,
    /// Optional single-field ordering.
    pub sort: Option<QuerySort>,
    /// Result limit.
    pub limit: Limit,
}

impl QueryOptions {
    /// Whole documents, unsorted, with the default limit.
    pub fn new() -> Self {
        QueryOptions::default()
    }

    /// Restricts the returned fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Orders results by one field.
    pub fn sort_by(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.sort = Some(QuerySort {
            field: field.into(),
            direction: direction.into(),
        });
        self
    }

    /// Caps the number of results.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Limit::Bounded(limit);
        self
    }

    /// Asks for every matching document.
    pub fn no_limit(mut self) -> Self {
        self.limit = Limit::Unbounded;
        self
    }
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// One entry of a Mango `sort` array: a bare field name (ascending) or a
/// `{field: direction}` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortEntry {
    /// `"field"`, sorted ascending.
    Field(String),
    /// `{"field": "asc" | "desc"}`.
    Directed(BTreeMap<String, Dir>),
}

impl SortEntry {
    /// A single-field entry with an explicit direction.
    pub fn directed(field: impl Into<String>, dir: Dir) -> Self {
        SortEntry::Directed(BTreeMap::from([(field.into(), dir)]))
    }

    /// The `(field, direction)` pairs this entry names.
    pub fn pairs(&self) -> Vec<(&str, Dir)> {
        match self {
            SortEntry::Field(field) => vec![(field.as_str(), Dir::Asc)],
            SortEntry::Directed(map) => map.iter().map(|(field, dir)| (field.as_str(), *dir)).collect(),
        }
    }
}

/// A store-agnostic query: selector, optional projection and ordering, and
/// a limit.
///
/// Serializes to the Mango JSON shape:
///
/// ```json
/// {"selector": {"age": {"$gt": 25}}, "fields": ["name"], "sort": [{"age": "desc"}], "limit": 25}
/// ```
///
/// Other top-level keys of a hand-written query (`skip`, `use_index`, ...)
/// are kept as they are and written back out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    #[serde(default)]
    selector: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort: Option<Vec<SortEntry>>,
    #[serde(default = "default_limit")]
    limit: u64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        QueryDescriptor::from_selector(Map::new())
    }
}

impl QueryDescriptor {
    /// A descriptor with the given selector and the default limit.
    pub fn from_selector(selector: Map<String, Value>) -> Self {
        QueryDescriptor {
            selector,
            fields: None,
            sort: None,
            limit: DEFAULT_LIMIT,
            extra: Map::new(),
        }
    }

    /// Parses a hand-written descriptor.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Renders the descriptor as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the descriptor as a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// The Mango selector.
    pub fn selector(&self) -> &Map<String, Value> {
        &self.selector
    }

    /// The projection, if one was set.
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    /// Ordering as `(field, direction)` pairs.
    pub fn sort(&self) -> Vec<(&str, Dir)> {
        self.sort.iter().flatten().flat_map(SortEntry::pairs).collect()
    }

    /// The result limit.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Top-level keys this type does not model, such as `skip`.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Builds a query descriptor from query-builder rows.
///
/// Rows with an empty field or an empty value are skipped, as are `$mod`
/// rows without exactly two integers and `$size` rows without an integer.
/// A later row on the same field replaces an earlier one.
///
/// # Example
///
/// ```
/// use docsift::{build_query, QueryCondition, QueryOptions};
/// use serde_json::json;
///
/// let conditions = vec![QueryCondition::new("age", "$gt", "25")];
/// let query = build_query(&conditions, &QueryOptions::new());
/// assert_eq!(
///     query.to_value().unwrap(),
///     json!({"selector": {"age": {"$gt": 25}}, "limit": 25})
/// );
/// ```
pub fn build_query(conditions: &[QueryCondition], options: &QueryOptions) -> QueryDescriptor {
    let mut selector = Map::new();
    for condition in conditions {
        match condition.to_predicate() {
            Some(predicate) => {
                selector.insert(condition.field.clone(), predicate);
            }
            None => {
                tracing::trace!(field = %condition.field, operator = %condition.operator, "skipping query row");
            }
        }
    }

    let fields = (!options.fields.is_empty()).then(|| options.fields.clone());
    let sort = options
        .sort
        .as_ref()
        .filter(|sort| !sort.field.is_empty())
        .map(|sort| vec![SortEntry::directed(sort.field.clone(), Dir::parse(&sort.direction))]);

    QueryDescriptor {
        selector,
        fields,
        sort,
        limit: options.limit.resolve(),
        extra: Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn selector_of(conditions: &[QueryCondition]) -> Value {
        Value::Object(build_query(conditions, &QueryOptions::new()).selector().clone())
    }

    fn one(field: &str, op: &str, value: &str) -> Value {
        selector_of(&[QueryCondition::new(field, op, value)])
    }

    #[test]
    fn relational_values_become_numbers() {
        let query = build_query(&[QueryCondition::new("age", "$gt", "25")], &QueryOptions::new());
        assert_eq!(
            query.to_value().unwrap(),
            json!({"selector": {"age": {"$gt": 25}}, "limit": 25})
        );
        assert_eq!(one("name", "$lt", "m"), json!({"name": {"$lt": "m"}}));
        assert_eq!(one("score", "$gte", "2.5"), json!({"score": {"$gte": 2.5}}));
        assert_eq!(one("name", "$regex", "^a"), json!({"name": {"$regex": "^a"}}));
    }

    #[test]
    fn equality_is_literal() {
        assert_eq!(one("age", "$eq", "25"), json!({"age": "25"}));
    }

    #[test]
    fn exists_is_boolean() {
        assert_eq!(one("tag", "$exists", "TRUE"), json!({"tag": {"$exists": true}}));
        assert_eq!(one("tag", "$exists", "no"), json!({"tag": {"$exists": false}}));
    }

    #[test]
    fn list_operators_split_and_coerce() {
        assert_eq!(one("n", "$in", "1, b ,3"), json!({"n": {"$in": [1, "b", 3]}}));
        assert_eq!(one("n", "$nin", "x"), json!({"n": {"$nin": ["x"]}}));
        assert_eq!(one("tags", "$all", "a,b"), json!({"tags": {"$all": ["a", "b"]}}));
    }

    #[test]
    fn modulo_needs_two_integers() {
        assert_eq!(one("n", "$mod", "4, 1"), json!({"n": {"$mod": [4, 1]}}));
        assert_eq!(one("n", "$mod", "4"), json!({}));
        assert_eq!(one("n", "$mod", "4,1,2"), json!({}));
        assert_eq!(one("n", "$mod", "4,x"), json!({}));
    }

    #[test]
    fn size_is_integer() {
        assert_eq!(one("tags", "$size", "3"), json!({"tags": {"$size": 3}}));
        assert_eq!(one("tags", "$size", "many"), json!({}));
    }

    #[test]
    fn incomplete_rows_are_skipped() {
        let rows = vec![
            QueryCondition::new("", "$eq", "x"),
            QueryCondition::new("a", "$eq", ""),
        ];
        assert_eq!(selector_of(&rows), json!({}));
    }

    #[test]
    fn whitespace_values_are_kept() {
        assert_eq!(one("code", "$eq", " "), json!({"code": " "}));
        assert_eq!(one("code", "$gt", "  "), json!({"code": {"$gt": "  "}}));
    }

    #[test]
    fn later_rows_replace_earlier() {
        let rows = vec![
            QueryCondition::new("age", "$gt", "10"),
            QueryCondition::new("age", "$lt", "20"),
        ];
        assert_eq!(selector_of(&rows), json!({"age": {"$lt": 20}}));
    }

    #[test]
    fn options_shape_the_descriptor() {
        let options = QueryOptions::new()
            .fields(["name", "age"])
            .sort_by("age", "Ascending")
            .no_limit();
        let query = build_query(&[], &options);
        assert_eq!(
            query.to_value().unwrap(),
            json!({
                "selector": {},
                "fields": ["name", "age"],
                "sort": [{"age": "asc"}],
                "limit": 1_000_000
            })
        );
        assert_eq!(query.sort(), vec![("age", Dir::Asc)]);

        let desc = build_query(&[], &QueryOptions::new().sort_by("age", "DESC").limit(5));
        assert_eq!(desc.sort(), vec![("age", Dir::Desc)]);
        assert_eq!(desc.limit(), 5);
        assert!(desc.fields().is_none());

        let unsorted = build_query(&[], &QueryOptions::new().sort_by("", "asc"));
        assert!(unsorted.sort().is_empty());
        assert!(!unsorted.to_value().unwrap().as_object().unwrap().contains_key("sort"));
    }

    #[test]
    fn hand_written_descriptors_parse() {
        let query = QueryDescriptor::from_json(
            r#"{"selector": {"type": "user"}, "sort": [{"name": "desc"}]}"#,
        )
        .unwrap();
        assert_eq!(query.selector().get("type"), Some(&json!("user")));
        assert_eq!(query.sort(), vec![("name", Dir::Desc)]);
        assert_eq!(query.limit(), DEFAULT_LIMIT);

        assert!(query.extra().is_empty());

        assert!(QueryDescriptor::from_json("{not json").is_err());
        assert_eq!(QueryDescriptor::default().limit(), 25);
    }

    #[test]
    fn bare_field_sort_entries_are_ascending() {
        let query = QueryDescriptor::from_json(
            r#"{"selector": {}, "sort": ["name", {"age": "desc"}]}"#,
        )
        .unwrap();
        assert_eq!(query.sort(), vec![("name", Dir::Asc), ("age", Dir::Desc)]);
        assert_eq!(query.to_value().unwrap()["sort"], json!(["name", {"age": "desc"}]));
    }

    #[test]
    fn unmodelled_keys_round_trip() {
        let query = QueryDescriptor::from_json(
            r#"{"selector": {"a": 1}, "skip": 20, "use_index": "idx", "limit": 10}"#,
        )
        .unwrap();
        assert_eq!(query.limit(), 10);
        assert_eq!(query.extra().get("skip"), Some(&json!(20)));
        assert_eq!(
            query.to_value().unwrap(),
            json!({"selector": {"a": 1}, "skip": 20, "use_index": "idx", "limit": 10})
        );
    }

    #[test]
    fn condition_serde_defaults() {
        let row: QueryCondition = serde_json::from_value(json!({"field": "a"})).unwrap();
        assert_eq!(row, QueryCondition::new("a", "$eq", ""));
    }
}
