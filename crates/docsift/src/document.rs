//! Documents and field access.
//!
//! The [`Seekable`] trait is the seam between the algorithms in this crate
//! and whatever holds the data. It is implemented for [`Document`], for raw
//! `serde_json` objects, and for references to any seekable type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SeekerError};

/// Name of the identifier field in stored documents.
pub const ID_FIELD: &str = "_id";

/// Trait for values whose fields can be read by name.
///
/// # Example
///
/// ```
/// use docsift::Seekable;
/// use serde_json::json;
///
/// let doc = json!({"name": "Ada", "address": {"city": "London"}});
/// assert_eq!(doc.seek("name"), Some(&json!("Ada")));
/// assert_eq!(doc.seek("address.city"), Some(&json!("London")));
/// assert_eq!(doc.seek("missing"), None);
/// ```
pub trait Seekable {
    /// Returns the value of a top-level field, if present.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Iterates the top-level field names.
    fn field_names(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Looks up a field by name or dot-separated path.
    ///
    /// An exact top-level key wins over path traversal, so keys that
    /// themselves contain dots stay reachable. Numeric path segments index
    /// into arrays.
    fn seek(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.field(path) {
            return Some(value);
        }
        let (head, rest) = path.split_once('.')?;
        let mut current = self.field(head)?;
        for segment in rest.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl Seekable for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn field_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.keys().map(String::as_str))
    }
}

impl Seekable for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(name))
    }

    fn field_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Value::Object(map) => map.field_names(),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl<T: Seekable + ?Sized> Seekable for &T {
    fn field(&self, name: &str) -> Option<&Value> {
        (**self).field(name)
    }

    fn field_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        (**self).field_names()
    }

    fn seek(&self, path: &str) -> Option<&Value> {
        (**self).seek(path)
    }
}

/// A schemaless document: a JSON object plus its identifier.
///
/// Serializes as the bare JSON object. The identifier comes from `_id`, or
/// from the row when built with [`Document::from_row`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Document {
    id: Option<String>,
    fields: Map<String, Value>,
}

impl Document {
    /// Wraps a JSON object, taking the identifier from `_id`.
    pub fn new(fields: Map<String, Value>) -> Self {
        let id = fields
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .map(str::to_owned);
        Document { id, fields }
    }

    /// Wraps a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Document::new(fields)),
            other => Err(SeekerError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }

    /// Builds a document from a list-documents row (`{id, key, value, doc}`).
    ///
    /// When the row carries no embedded `doc` object, the row itself is
    /// treated as the document.
    pub fn from_row(row: Value) -> Result<Self> {
        let mut row = match row {
            Value::Object(row) => row,
            other => {
                return Err(SeekerError::NotAnObject {
                    found: json_type_name(&other),
                })
            }
        };
        match row.remove("doc") {
            Some(Value::Object(fields)) => {
                let mut doc = Document::new(fields);
                if let Some(id) = row.get("id").and_then(Value::as_str) {
                    doc.id = Some(id.to_owned());
                }
                Ok(doc)
            }
            Some(other) => {
                row.insert("doc".to_owned(), other);
                Ok(Document::new(row))
            }
            None => Ok(Document::new(row)),
        }
    }

    /// Returns the document identifier, if known.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the underlying JSON object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a top-level field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the document, returning its JSON object.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Document::new(fields)
    }
}

impl From<Document> for Map<String, Value> {
    fn from(doc: Document) -> Self {
        doc.fields
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.fields)
    }
}

impl Seekable for Document {
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn field_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        self.fields.field_names()
    }
}

/// Loads a document collection from JSON.
///
/// Accepts a bare array of documents or rows, a list-documents response
/// (`{"rows": [...]}`) or a query response (`{"docs": [...]}`).
pub fn load_documents(value: Value) -> Result<Vec<Document>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("rows").or_else(|| map.remove("docs")) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(SeekerError::NotACollection {
                    found: json_type_name(&other),
                })
            }
            None => return Err(SeekerError::NotACollection { found: "object" }),
        },
        other => {
            return Err(SeekerError::NotACollection {
                found: json_type_name(&other),
            })
        }
    };
    items.into_iter().map(Document::from_row).collect()
}

/// Returns the JSON type name of a value, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
