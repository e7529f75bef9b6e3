//! Error types for document storage.

use std::fmt;

/// Errors from document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The document to update does not exist.
    NotFound { collection: String, id: String },
    /// Stored or supplied data is not a JSON object.
    InvalidDocument { collection: String, reason: String },
    /// The backing database failed.
    Backend { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { collection, id } => {
                write!(f, "document '{collection}/{id}' not found")
            }
            Self::InvalidDocument { collection, reason } => {
                write!(f, "invalid document in '{collection}': {reason}")
            }
            Self::Backend { details } => write!(f, "document store error: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Backend {
            details: e.to_string(),
        }
    }
}
