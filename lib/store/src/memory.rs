//! In-process document store.
//!
//! Backs local development and tests. Collections are kept in ordered maps
//! so queries return documents in id order, matching the Postgres store.

use async_trait::async_trait;
use rootcause::prelude::Report;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::document::{Document, DocumentStore, FieldFilter, StoredDocument};
use crate::error::StoreError;

/// Document store held in memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, Report<StoreError>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), Report<StoreError>> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), Report<StoreError>> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        document.extend(patch);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, Report<StoreError>> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn query(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, Report<StoreError>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, data)| filter.is_none_or(|f| f.matches(data)))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(id, data)| StoredDocument {
                id: id.clone(),
                data: data.clone(),
            })
            .collect())
    }

    async fn batch_delete(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<u64, Report<StoreError>> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let removed = ids.iter().filter(|id| docs.remove(*id).is_some()).count();
        Ok(removed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryDocumentStore::new();
        store
            .set("users", "uid-1", doc(json!({"uid": "uid-1"})))
            .await
            .expect("set");

        let fetched = store.get("users", "uid-1").await.expect("get");
        assert_eq!(fetched, Some(doc(json!({"uid": "uid-1"}))));

        assert!(store.delete("users", "uid-1").await.expect("delete"));
        assert!(!store.delete("users", "uid-1").await.expect("delete again"));
        assert_eq!(store.get("users", "uid-1").await.expect("get"), None);
    }

    #[tokio::test]
    async fn update_merges_top_level_fields() {
        let store = MemoryDocumentStore::new();
        store
            .set("users", "uid-1", doc(json!({"uid": "uid-1", "role": "user"})))
            .await
            .expect("set");
        store
            .update("users", "uid-1", doc(json!({"role": "admin"})))
            .await
            .expect("update");

        let fetched = store.get("users", "uid-1").await.expect("get");
        assert_eq!(fetched, Some(doc(json!({"uid": "uid-1", "role": "admin"}))));
    }

    #[tokio::test]
    async fn update_missing_document_fails() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update("users", "ghost", Document::new())
            .await
            .unwrap_err();
        assert!(matches!(err.current_context(), StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn query_filters_and_limits() {
        let store = MemoryDocumentStore::new();
        for (id, uid) in [("a", "uid-1"), ("b", "uid-2"), ("c", "uid-2"), ("d", "uid-2")] {
            store
                .set("user_settings", id, doc(json!({"uid": uid})))
                .await
                .expect("set");
        }

        let filter = FieldFilter::eq("uid", "uid-2");
        let all = store
            .query("user_settings", Some(&filter), None)
            .await
            .expect("query");
        assert_eq!(
            all.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            ["b", "c", "d"]
        );

        let limited = store
            .query("user_settings", Some(&filter), Some(2))
            .await
            .expect("query");
        assert_eq!(limited.len(), 2);

        assert!(store.query("missing", None, None).await.expect("query").is_empty());
    }

    #[tokio::test]
    async fn batch_delete_counts_existing() {
        let store = MemoryDocumentStore::new();
        for id in ["a", "b"] {
            store.set("users", id, Document::new()).await.expect("set");
        }
        let removed = store
            .batch_delete("users", &["a".to_string(), "b".to_string(), "z".to_string()])
            .await
            .expect("batch");
        assert_eq!(removed, 2);
        assert_eq!(store.count("users").await, 0);
    }
}
