//! Saved queries.
//!
//! A [`SavedQuery`] pairs a [`QueryDescriptor`] with the results it last
//! produced. [`SavedQueries`] is an in-memory list of them that reads and
//! writes the JSON array a query store keeps; where that array lives is up
//! to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Result;
use crate::selector::QueryDescriptor;

/// The response to an executed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    pub docs: Vec<Document>,
    /// Paging token for the next batch, when the store returns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
    /// Store warning, such as a missing index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl QueryResults {
    /// Results without a bookmark or warning.
    pub fn new(docs: Vec<Document>) -> Self {
        QueryResults {
            docs,
            ..QueryResults::default()
        }
    }
}

/// A named query with its last results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    /// Unique within a [`SavedQueries`] collection.
    pub id: String,
    pub name: String,
    /// Database the query runs against.
    pub database: String,
    pub query: QueryDescriptor,
    #[serde(default)]
    pub results: QueryResults,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedQuery {
    /// Creates a record stamped with the current time. The id is the
    /// creation time in epoch milliseconds.
    pub fn new(
        name: impl Into<String>,
        database: impl Into<String>,
        query: QueryDescriptor,
        results: QueryResults,
    ) -> Self {
        SavedQuery::new_at(name, database, query, results, Utc::now())
    }

    /// Like [`SavedQuery::new`] with an explicit creation time.
    pub fn new_at(
        name: impl Into<String>,
        database: impl Into<String>,
        query: QueryDescriptor,
        results: QueryResults,
        now: DateTime<Utc>,
    ) -> Self {
        SavedQuery {
            id: now.timestamp_millis().to_string(),
            name: name.into(),
            database: database.into(),
            query,
            results,
            created_at: now,
            updated_at: now,
        }
    }

    /// Renames the query and updates its timestamp.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Replaces the query and its results after a re-run.
    pub fn refresh(&mut self, query: QueryDescriptor, results: QueryResults) {
        self.query = query;
        self.results = results;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// An ordered collection of saved queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedQueries {
    queries: Vec<SavedQuery>,
}

impl SavedQueries {
    /// An empty collection.
    pub fn new() -> Self {
        SavedQueries::default()
    }

    /// Parses a stored JSON array.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Renders the collection as an indented JSON array.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds a query, adjusting its id if another query already uses it.
    /// Returns the stored id.
    pub fn add(&mut self, mut query: SavedQuery) -> String {
        while self.get(&query.id).is_some() {
            query.id = match query.id.parse::<i64>().ok().and_then(|n| n.checked_add(1)) {
                Some(next) => next.to_string(),
                None => format!("{}-1", query.id),
            };
        }
        tracing::debug!(id = %query.id, name = %query.name, "saved query");
        let id = query.id.clone();
        self.queries.push(query);
        id
    }

    /// Looks up a query by id.
    pub fn get(&self, id: &str) -> Option<&SavedQuery> {
        self.queries.iter().find(|q| q.id == id)
    }

    /// Looks up a query by id for editing.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut SavedQuery> {
        self.queries.iter_mut().find(|q| q.id == id)
    }

    /// Removes a query by id, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<SavedQuery> {
        let index = self.queries.iter().position(|q| q.id == id)?;
        Some(self.queries.remove(index))
    }

    /// Queries saved against `database`, in insertion order.
    pub fn for_database<'a>(&'a self, database: &'a str) -> impl Iterator<Item = &'a SavedQuery> + 'a {
        self.queries.iter().filter(move |q| q.database == database)
    }

    /// All queries, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SavedQuery> {
        self.queries.iter()
    }

    /// Number of saved queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Returns `true` if nothing is saved.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
