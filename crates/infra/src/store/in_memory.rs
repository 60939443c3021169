use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::trace;

use flatshare_core::{Collection, Entity};

use super::r#trait::{DocumentRef, DocumentStore, StoreError};

/// What happened when a delete reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionAttempt {
    Deleted,
    NotFound,
    Failed(String),
}

/// One entry of the store's delete log.
///
/// `sequence` is assigned while the collection lock is held, so it reflects
/// the order in which deletes actually took effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRecord {
    pub sequence: u64,
    pub collection: Collection,
    pub id: String,
    pub attempt: DeletionAttempt,
}

#[derive(Debug, Default)]
struct Faults {
    deletes: HashMap<(Collection, String), String>,
    queries: HashMap<Collection, String>,
}

/// In-memory document store.
///
/// Intended for tests/dev. Supports failure injection per document or per
/// collection and keeps a log of every delete attempt.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, JsonValue>>>,
    faults: RwLock<Faults>,
    log: Mutex<Vec<DeletionRecord>>,
    sequence: AtomicU64,
    delete_latency: Option<Duration>,
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every delete by `latency` before it is applied.
    pub fn with_delete_latency(mut self, latency: Duration) -> Self {
        self.delete_latency = Some(latency);
        self
    }

    /// Insert (or replace) a typed document.
    pub fn insert<E: Entity>(&self, entity: &E) -> Result<(), StoreError> {
        let body = entity.to_document()?;
        self.insert_raw(E::COLLECTION, entity.id().as_ref(), body)
    }

    /// Insert (or replace) a raw JSON body under `id`.
    pub fn insert_raw(
        &self,
        collection: Collection,
        id: impl Into<String>,
        body: JsonValue,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections.entry(collection).or_default().insert(id.into(), body);
        Ok(())
    }

    pub fn get(&self, collection: Collection, id: &str) -> Option<JsonValue> {
        let collections = self.collections.read().ok()?;
        collections.get(&collection)?.get(id).cloned()
    }

    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        self.get(collection, id).is_some()
    }

    pub fn count(&self, collection: Collection) -> usize {
        match self.collections.read() {
            Ok(c) => c.get(&collection).map(BTreeMap::len).unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Every document of a collection, ordered by id.
    pub fn list(&self, collection: Collection) -> Result<Vec<DocumentRef>, StoreError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, body)| DocumentRef {
                        collection,
                        id: id.clone(),
                        body: body.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Make every delete of `collection/id` fail with a backend error.
    pub fn fail_delete(&self, collection: Collection, id: impl Into<String>, reason: impl Into<String>) {
        if let Ok(mut faults) = self.faults.write() {
            faults.deletes.insert((collection, id.into()), reason.into());
        }
    }

    /// Make every lookup against `collection` fail with a backend error.
    pub fn fail_queries(&self, collection: Collection, reason: impl Into<String>) {
        if let Ok(mut faults) = self.faults.write() {
            faults.queries.insert(collection, reason.into());
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut faults) = self.faults.write() {
            *faults = Faults::default();
        }
    }

    /// Snapshot of all delete attempts, in the order they took effect.
    pub fn deletion_log(&self) -> Vec<DeletionRecord> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(_) => vec![],
        }
    }

    fn record(&self, collection: Collection, id: &str, attempt: DeletionAttempt) -> Result<(), StoreError> {
        let mut log = self.log.lock().map_err(|_| poisoned())?;
        log.push(DeletionRecord {
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            collection,
            id: id.to_string(),
            attempt,
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<DocumentRef>, StoreError> {
        if let Some(reason) = self.faults.read().map_err(|_| poisoned())?.queries.get(&collection) {
            return Err(StoreError::Backend(reason.clone()));
        }

        let collections = self.collections.read().map_err(|_| poisoned())?;
        let Some(docs) = collections.get(&collection) else {
            return Ok(vec![]);
        };

        Ok(docs
            .iter()
            .filter(|(_, body)| body.get(field).and_then(JsonValue::as_str) == Some(value))
            .map(|(id, body)| DocumentRef {
                collection,
                id: id.clone(),
                body: body.clone(),
            })
            .collect())
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        if let Some(latency) = self.delete_latency {
            tokio::time::sleep(latency).await;
        }

        let injected = self
            .faults
            .read()
            .map_err(|_| poisoned())?
            .deletes
            .get(&(collection, id.to_string()))
            .cloned();

        let mut collections = self.collections.write().map_err(|_| poisoned())?;

        if let Some(reason) = injected {
            self.record(collection, id, DeletionAttempt::Failed(reason.clone()))?;
            return Err(StoreError::Backend(reason));
        }

        let removed = collections
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .is_some();

        if removed {
            trace!(%collection, id, "document deleted");
            self.record(collection, id, DeletionAttempt::Deleted)?;
            Ok(())
        } else {
            self.record(collection, id, DeletionAttempt::NotFound)?;
            Err(StoreError::not_found(collection, id))
        }
    }
}
