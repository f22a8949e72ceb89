//! Subcommand implementations. Each returns the JSON it would print.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use docsift::{
    build_query, extract_fields, filterable_fields, infer_field_type, load_documents, Document,
    FieldType, FilterCondition, Limit, Logic, PageInfo, QueryCondition, QueryOptions, SortKey,
    View,
};
use serde::Serialize;
use serde_json::Value;

/// Reads a document collection from a JSON file.
pub fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let docs = load_documents(value).with_context(|| format!("loading {}", path.display()))?;
    tracing::debug!(count = docs.len(), path = %path.display(), "loaded documents");
    Ok(docs)
}

#[derive(Debug, Serialize)]
struct FieldEntry {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
}

/// Lists field names, optionally with their inferred types.
pub fn fields(docs: &[Document], include_internal: bool, with_types: bool) -> Result<Value> {
    let names = if include_internal {
        extract_fields(docs)
    } else {
        filterable_fields(docs)
    };
    if !with_types {
        return Ok(serde_json::to_value(names)?);
    }
    let entries: Vec<FieldEntry> = names
        .into_iter()
        .map(|name| FieldEntry {
            field_type: infer_field_type(docs, &name),
            name,
        })
        .collect();
    Ok(serde_json::to_value(entries)?)
}

/// A saved view file.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewFile {
    pub view: View,
    /// The file names its own `pageSize`.
    pub sets_page_size: bool,
}

/// Settings gathered from the `view` subcommand's flags.
#[derive(Debug, Default)]
pub struct ViewRequest {
    pub base: Option<ViewFile>,
    pub filters: Vec<FilterCondition>,
    pub types: BTreeMap<String, FieldType>,
    pub any: bool,
    pub sort: Vec<SortKey>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    /// Used only when neither `page_size` nor the view file sets a size.
    pub default_page_size: Option<usize>,
}

impl ViewRequest {
    /// Merges the flags over the base view.
    ///
    /// Filters given on the command line take their type from `types`, or
    /// from the documents when no type is given. The base view's page is
    /// kept unless `page` is given.
    pub fn into_view(self, docs: &[Document]) -> View {
        let (mut view, file_sets_page_size) = match self.base {
            Some(file) => (file.view, file.sets_page_size),
            None => (View::default(), false),
        };
        for condition in self.filters {
            let field_type = self
                .types
                .get(&condition.field)
                .copied()
                .unwrap_or_else(|| infer_field_type(docs, &condition.field));
            view.filters.push(condition.with_type(field_type));
        }
        for key in self.sort {
            let key = match self.types.get(&key.field) {
                Some(ty) => key.with_type(*ty),
                None => key,
            };
            view.sort.push(key);
        }
        if self.any {
            view.logic = Logic::Or;
        }
        match (self.page_size, self.default_page_size) {
            (Some(size), _) => view.page_size = size,
            (None, Some(size)) if !file_sets_page_size => view.page_size = size,
            _ => {}
        }
        if let Some(page) = self.page {
            view.page = page;
        }
        view
    }
}

#[derive(Debug, Serialize)]
struct ViewOutput<'a> {
    info: PageInfo,
    docs: Vec<&'a Document>,
}

/// Filters, sorts and paginates the documents.
pub fn view(docs: &[Document], request: ViewRequest) -> Result<Value> {
    let view = request.into_view(docs);
    tracing::debug!(
        filters = view.filters.len(),
        sort = view.sort.len(),
        page = view.page,
        "running view"
    );
    let page = view.apply(docs).context("invalid page settings")?;
    let output = ViewOutput {
        info: page.info,
        docs: page.items,
    };
    Ok(serde_json::to_value(output)?)
}

/// Builds a Mango query descriptor.
pub fn query(
    conditions: &[QueryCondition],
    fields: Vec<String>,
    sort: Option<(String, String)>,
    limit: Limit,
) -> Result<Value> {
    let mut options = QueryOptions::new().fields(fields);
    if let Some((field, direction)) = sort {
        options = options.sort_by(field, direction);
    }
    options.limit = limit;
    Ok(build_query(conditions, &options).to_value()?)
}

/// Loads a saved view file.
pub fn read_view(path: &Path) -> Result<ViewFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let sets_page_size = value.get("pageSize").is_some();
    let view: View = serde_json::from_value(value)
        .with_context(|| format!("{} is not a valid view", path.display()))?;
    Ok(ViewFile {
        view,
        sets_page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    fn sample_docs() -> Vec<Document> {
        let file = write_json(&json!({
            "rows": [
                {"id": "a", "doc": {"_id": "a", "name": "Ada", "age": 36}},
                {"id": "b", "doc": {"_id": "b", "name": "Bob", "age": "19"}},
                {"id": "c", "doc": {"_id": "c", "name": "Cy", "age": 52}}
            ]
        }));
        read_documents(file.path()).unwrap()
    }

    #[test]
    fn reads_rows_and_reports_bad_files() {
        assert_eq!(sample_docs().len(), 3);

        let mut bad = NamedTempFile::new().unwrap();
        write!(bad, "not json").unwrap();
        let err = read_documents(bad.path()).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));

        let scalar = write_json(&json!(42));
        assert!(read_documents(scalar.path()).is_err());
    }

    #[test]
    fn lists_fields() {
        let docs = sample_docs();
        assert_eq!(fields(&docs, false, false).unwrap(), json!(["age", "name"]));
        assert_eq!(fields(&docs, true, false).unwrap(), json!(["_id", "age", "name"]));
        assert_eq!(
            fields(&docs, false, true).unwrap(),
            json!([{"name": "age", "type": "number"}, {"name": "name", "type": "string"}])
        );
    }

    #[test]
    fn view_infers_filter_types() {
        let docs = sample_docs();
        let request = ViewRequest {
            filters: vec![FilterCondition::new("age", "greaterThan", "30")],
            sort: vec![SortKey::desc("age")],
            ..ViewRequest::default()
        };
        let out = view(&docs, request).unwrap();
        assert_eq!(out["info"]["totalItems"], 2);
        assert_eq!(out["docs"][0]["_id"], "c");
        assert_eq!(out["docs"][1]["_id"], "a");
    }

    #[test]
    fn explicit_types_win() {
        let docs = sample_docs();
        let mut types = BTreeMap::new();
        types.insert("age".to_string(), FieldType::String);
        let request = ViewRequest {
            filters: vec![FilterCondition::new("age", "equals", "19")],
            types,
            ..ViewRequest::default()
        };
        let out = view(&docs, request).unwrap();
        assert_eq!(out["docs"][0]["_id"], "b");
        assert_eq!(out["info"]["totalItems"], 1);
    }

    #[test]
    fn view_file_is_the_base() {
        let docs = sample_docs();
        let file = write_json(&json!({"sort": [{"field": "name", "direction": "desc"}], "pageSize": 2}));
        let base = read_view(file.path()).unwrap();
        let request = ViewRequest {
            base: Some(base),
            page: Some(2),
            ..ViewRequest::default()
        };
        let out = view(&docs, request).unwrap();
        assert_eq!(out["docs"], json!([{"_id": "a", "name": "Ada", "age": 36}]));
        assert_eq!(out["info"]["totalPages"], 2);
    }

    #[test]
    fn flags_keep_the_saved_page() {
        let docs = sample_docs();
        let file = write_json(&json!({"page": 2, "pageSize": 2}));
        let request = ViewRequest {
            base: Some(read_view(file.path()).unwrap()),
            filters: vec![FilterCondition::new("name", "isNotNull", "-")],
            sort: vec![SortKey::asc("name")],
            default_page_size: Some(1),
            ..ViewRequest::default()
        };
        let out = view(&docs, request).unwrap();
        assert_eq!(out["info"]["page"], 2);
        assert_eq!(out["info"]["pageSize"], 2);
        assert_eq!(out["docs"], json!([{"_id": "c", "name": "Cy", "age": 52}]));
    }

    #[test]
    fn default_page_size_fills_gaps_only() {
        let docs = sample_docs();
        let file = write_json(&json!({"page": 2}));
        let request = ViewRequest {
            base: Some(read_view(file.path()).unwrap()),
            default_page_size: Some(1),
            ..ViewRequest::default()
        };
        let out = view(&docs, request).unwrap();
        assert_eq!(out["info"]["pageSize"], 1);
        assert_eq!(out["docs"][0]["_id"], "b");

        let request = ViewRequest {
            page_size: Some(3),
            default_page_size: Some(1),
            ..ViewRequest::default()
        };
        let out = view(&docs, request).unwrap();
        assert_eq!(out["info"]["pageSize"], 3);
        assert_eq!(out["info"]["hasNext"], false);
    }

    #[test]
    fn page_zero_is_an_error() {
        let docs = sample_docs();
        let request = ViewRequest {
            page: Some(0),
            ..ViewRequest::default()
        };
        assert!(view(&docs, request).is_err());
    }

    #[test]
    fn builds_queries() {
        let out = query(
            &[QueryCondition::new("age", "$gt", "25")],
            vec!["name".to_string()],
            Some(("age".to_string(), "asc".to_string())),
            Limit::Unbounded,
        )
        .unwrap();
        assert_eq!(
            out,
            json!({
                "selector": {"age": {"$gt": 25}},
                "fields": ["name"],
                "sort": [{"age": "asc"}],
                "limit": 1_000_000
            })
        );
    }
}
