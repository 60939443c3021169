//! Postgres-backed document store.
//!
//! Documents of every collection live in one table keyed by
//! `(collection, id)` with the schema-less body in a `jsonb` column. Equality
//! lookups compare `body ->> field` (with fixed statements for the indexed
//! reference fields), which mirrors the store contract: no
//! foreign keys and no cascades, only per-document operations.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | PoolTimedOut, PoolClosed, Io | `Unavailable` |
//! | Decode / ColumnDecode | `Serialization` |
//! | anything else | `Backend` |

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};
use tracing::instrument;

use flatshare_core::{fields, Collection, Entity};

use super::r#trait::{DocumentRef, DocumentStore, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        body JSONB NOT NULL,
        PRIMARY KEY (collection, id)
    )
"#;

/// Lookups on the three reference fields are the hot path of a cascade.
const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS documents_messages_sender ON documents ((body ->> 'senderId')) WHERE collection = 'messages'",
    "CREATE INDEX IF NOT EXISTS documents_messages_flat ON documents ((body ->> 'flatID')) WHERE collection = 'messages'",
    "CREATE INDEX IF NOT EXISTS documents_flats_owner ON documents ((body ->> 'ownerID')) WHERE collection = 'flats'",
];

#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the documents table and lookup indexes if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        for stmt in CREATE_INDEXES {
            sqlx::query(stmt)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    /// Insert (or replace) a typed document.
    #[instrument(skip(self, entity), err)]
    pub async fn insert<E: Entity + Sync>(&self, entity: &E) -> Result<(), StoreError> {
        let body = entity.to_document()?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body
            "#,
        )
        .bind(E::COLLECTION.as_str())
        .bind(entity.id().as_ref())
        .bind(body)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(())
    }

    /// Every document of a collection, ordered by id.
    pub async fn list(&self, collection: Collection) -> Result<Vec<DocumentRef>, StoreError> {
        let rows = sqlx::query("SELECT id, body FROM documents WHERE collection = $1 ORDER BY id")
            .bind(collection.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(|row| document_from_row(collection, row)).collect()
    }
}

/// Fixed statements for the reference fields, matching the partial indexes in
/// `CREATE_INDEXES`. The field name has to be a literal in the SQL text or the
/// planner cannot match the index expression.
fn indexed_lookup(collection: Collection, field: &str) -> Option<&'static str> {
    match (collection, field) {
        (Collection::Messages, fields::SENDER_ID) => Some(
            "SELECT id, body FROM documents WHERE collection = 'messages' AND body ->> 'senderId' = $1 ORDER BY id",
        ),
        (Collection::Messages, fields::FLAT_ID) => Some(
            "SELECT id, body FROM documents WHERE collection = 'messages' AND body ->> 'flatID' = $1 ORDER BY id",
        ),
        (Collection::Flats, fields::OWNER_ID) => Some(
            "SELECT id, body FROM documents WHERE collection = 'flats' AND body ->> 'ownerID' = $1 ORDER BY id",
        ),
        _ => None,
    }
}

fn document_from_row(collection: Collection, row: &sqlx::postgres::PgRow) -> Result<DocumentRef, StoreError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::Serialization(format!("failed to read id column: {e}")))?;
    let body: JsonValue = row
        .try_get("body")
        .map_err(|e| StoreError::Serialization(format!("failed to read body column: {e}")))?;
    Ok(DocumentRef { collection, id, body })
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), err)]
    async fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        let query = match indexed_lookup(collection, field) {
            Some(sql) => sqlx::query(sql).bind(value),
            None => sqlx::query(
                "SELECT id, body FROM documents WHERE collection = $1 AND body ->> $2 = $3 ORDER BY id",
            )
            .bind(collection.as_str())
            .bind(field)
            .bind(value),
        };
        let rows = query
            .fetch_all(&*self.pool)
            .await
        .map_err(|e| map_sqlx_error("query_by_field", e))?;

        rows.iter().map(|row| document_from_row(collection, row)).collect()
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_document", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        sqlx::Error::Decode(_) | sqlx::Error::ColumnDecode { .. } => {
            StoreError::Serialization(format!("{operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
