//! PostgreSQL-backed document store.
//!
//! All collections share one `documents` table keyed by
//! `(collection, id)` with a JSONB body. The schema lives in the server's
//! migrations.

use async_trait::async_trait;
use rootcause::prelude::Report;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use crate::document::{Document, DocumentStore, FieldFilter, StoredDocument};
use crate::error::StoreError;

/// Row type for document queries.
#[derive(FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Value>,
}

impl DocumentRow {
    fn try_into_document(self, collection: &str) -> Result<StoredDocument, StoreError> {
        match self.data.0 {
            Value::Object(data) => Ok(StoredDocument { id: self.id, data }),
            _ => Err(StoreError::InvalidDocument {
                collection: collection.to_string(),
                reason: format!("document '{}' is not an object", self.id),
            }),
        }
    }
}

/// Document store over a Postgres connection pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self))]
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, Report<StoreError>> {
        let row: Option<DocumentRow> = sqlx::query_as(
            r#"
            SELECT id, data
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        match row {
            Some(r) => Ok(Some(r.try_into_document(collection)?.data)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, data))]
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), Report<StoreError>> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(data)))
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Document,
    ) -> Result<(), Report<StoreError>> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(patch)))
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, Report<StoreError>> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn query(
        &self,
        collection: &str,
        filter: Option<&FieldFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, Report<StoreError>> {
        // A NULL limit means no limit in Postgres.
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));

        let rows: Vec<DocumentRow> = match filter {
            Some(filter) => {
                sqlx::query_as(
                    r#"
                    SELECT id, data
                    FROM documents
                    WHERE collection = $1 AND data -> $2 = $3
                    ORDER BY id
                    LIMIT $4
                    "#,
                )
                .bind(collection)
                .bind(&filter.field)
                .bind(Json(&filter.value))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, data
                    FROM documents
                    WHERE collection = $1
                    ORDER BY id
                    LIMIT $2
                    "#,
                )
                .bind(collection)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(StoreError::from)?;

        debug!(count = rows.len(), "documents queried");
        rows.into_iter()
            .map(|row| row.try_into_document(collection).map_err(Report::from))
            .collect()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn batch_delete(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<u64, Report<StoreError>> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = ANY($2)
            "#,
        )
        .bind(collection)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(result.rows_affected())
    }
}
