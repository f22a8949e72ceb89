//! Error types for the docsift crate.
//!
//! Malformed filter or query input never produces an error; it degrades to a
//! no-op. These variants cover integration mistakes only.

use thiserror::Error;

/// Errors raised for precondition violations at the crate boundary.
#[derive(Debug, Error)]
pub enum SeekerError {
    /// A document (or list-documents row) was not a JSON object.
    #[error("expected a JSON object for a document, found {found}")]
    NotAnObject { found: &'static str },

    /// A document collection could not be located in the given JSON.
    #[error("expected an array of documents or an object with `rows` or `docs`, found {found}")]
    NotACollection { found: &'static str },

    /// Pages are numbered from 1.
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(usize),

    /// A page must hold at least one item.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Malformed JSON input.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for docsift operations.
pub type Result<T> = std::result::Result<T, SeekerError>;
