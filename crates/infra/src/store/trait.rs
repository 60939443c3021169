use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use flatshare_core::{Collection, DomainError};

/// A document returned by a lookup: its store-assigned id plus the raw body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub collection: Collection,
    pub id: String,
    pub body: JsonValue,
}

/// Document store operation error.
///
/// `NotFound` is part of the delete contract rather than a hard failure:
/// callers that need idempotent deletes treat it as success.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: Collection, id: String },

    #[error("store backend error: {0}")]
    Backend(String),

    #[error("document serialization failed: {0}")]
    Serialization(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        Self::Serialization(value.to_string())
    }
}

/// Query and delete capabilities the cascade engine consumes.
///
/// Every call is an I/O suspension point. Implementations must make
/// `delete_document` idempotent from the caller's point of view: deleting a
/// document that is already gone returns `StoreError::NotFound` and changes
/// nothing.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Equality lookup on a top-level string field.
    async fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<DocumentRef>, StoreError>;

    /// Delete a single document by id.
    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        (**self).query_by_field(collection, field, value).await
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        (**self).delete_document(collection, id).await
    }
}
