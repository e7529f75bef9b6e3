//! Document model and the store contract.

use async_trait::async_trait;
use seminar_pulse_core::Result;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A document body: a JSON object.
pub type Document = Map<String, Value>;

/// A document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

/// Equality filter on a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    /// Matches documents whose `field` equals `value`.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if the document satisfies the filter.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

/// Document database operations, scoped by collection name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a document by id.
    async fn get(&self, collection: &str, id: &str)
    -> Result<Option<Document>, StoreError>;

    /// Creates or replaces a document.
    async fn set(&self, collection: &str, id: &str, data: Document)
    -> Result<(), StoreError>;

    /// Merges top-level fields into an existing document.
    ///
    /// Fails with `StoreError::NotFound` if the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError>;

    /// Deletes a document. Returns false if it did not exist.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    /// Lists documents of a collection, optionally filtered, in id order.
    async fn query(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Deletes several documents at once. Returns how many existed.
    async fn batch_delete(&self, collection: &str, ids: &[String])
    -> Result<u64, StoreError>;
}

/// Serializes a value into a document body.
pub fn to_document<T: Serialize>(
    collection: &str,
    value: &T,
) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::InvalidDocument {
            collection: collection.to_string(),
            reason: "value is not an object".to_string(),
        }
        .into()),
        Err(e) => Err(StoreError::InvalidDocument {
            collection: collection.to_string(),
            reason: e.to_string(),
        }
        .into()),
    }
}

/// Deserializes a document body into a typed value.
pub fn from_document<T: DeserializeOwned>(
    collection: &str,
    document: Document,
) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document)).map_err(|e| {
        StoreError::InvalidDocument {
            collection: collection.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
