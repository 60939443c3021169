//! Cascading user removal.
//!
//! The document store cannot enforce references between users, flats and
//! messages, so removing a user is done by hand in three steps:
//!
//! 1. [`resolver::resolve`] snapshots every dependent document (read-only).
//! 2. [`orchestrator::execute`] deletes messages, then flats, then the user.
//! 3. [`reporter::report`] turns the result into an [`Outcome`] and updates
//!    the cached user directory on success.
//!
//! There is no rollback. A cascade that stops half way leaves only documents
//! whose parents still exist, and running it again finishes the job.
//!
//! ## Staleness window
//!
//! The deletion set is read once. A message created for the user or one of
//! their flats after resolution, but before its stage runs, is not in the set
//! and survives as an orphan. The store offers no transaction to close this
//! window; callers that care re-run the cascade.

pub mod orchestrator;
pub mod reporter;
pub mod resolver;
pub mod types;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use flatshare_core::UserId;

pub use types::{
    CascadeError, DeleteFailure, DeletionReport, DeletionSet, FailureCause, FailureReason, Halt,
    HaltReason, Outcome, Stage,
};

use crate::config::CascadeConfig;
use crate::store::DocumentStore;
use crate::view::UserDirectory;

/// Entry point for removing a user together with everything that references it.
///
/// The store is handed in explicitly; the engine holds no global state and
/// takes no locks, so engines for different users may run concurrently.
pub struct CascadeEngine<S> {
    store: S,
    directory: Option<Arc<dyn UserDirectory>>,
    config: CascadeConfig,
}

impl<S> CascadeEngine<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            directory: None,
            config: CascadeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Cached view to update after successful removals.
    pub fn with_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub async fn resolve(&self, user_id: &UserId) -> Result<DeletionSet, CascadeError> {
        resolver::resolve(&self.store, user_id).await
    }

    pub async fn execute(&self, set: &DeletionSet, cancel: &CancellationToken) -> DeletionReport {
        orchestrator::execute(&self.store, set, &self.config, cancel).await
    }

    pub fn report(&self, report: &DeletionReport) -> Outcome {
        reporter::report(report, self.directory.as_deref())
    }

    /// Remove a user, their flats, and every message referencing either.
    pub async fn remove_user_cascade(&self, user_id: &UserId) -> Outcome {
        self.remove_user_cascade_until(user_id, &CancellationToken::new())
            .await
    }

    /// Like [`CascadeEngine::remove_user_cascade`], stopping at the next
    /// stage boundary once `cancel` fires.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn remove_user_cascade_until(
        &self,
        user_id: &UserId,
        cancel: &CancellationToken,
    ) -> Outcome {
        let set = match self.resolve(user_id).await {
            Ok(set) => set,
            Err(err) => {
                warn!(error = %err, "resolution failed; nothing deleted");
                return reporter::resolution_failed(user_id, &err);
            }
        };

        let report = self.execute(&set, cancel).await;
        self.report(&report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatshare_core::{Collection, EntityType};
    use serde_json::json;

    use crate::store::InMemoryDocumentStore;
    use crate::view::{InMemoryUserDirectory, UserSummary};

    fn engine() -> (CascadeEngine<Arc<InMemoryDocumentStore>>, Arc<InMemoryUserDirectory>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert_raw(Collection::Users, "u1", json!({ "id": "u1" })).unwrap();
        store
            .insert_raw(Collection::Flats, "f1", json!({ "id": "f1", "ownerID": "u1" }))
            .unwrap();
        store
            .insert_raw(
                Collection::Messages,
                "m1",
                json!({ "id": "m1", "senderId": "u2", "flatID": "f1" }),
            )
            .unwrap();

        let directory = Arc::new(InMemoryUserDirectory::new());
        directory.upsert(UserSummary {
            user_id: UserId::new("u1"),
            email: "u1@example.com".to_string(),
            display_name: "u1".to_string(),
            is_admin: false,
        });

        let engine = CascadeEngine::new(store).with_directory(directory.clone());
        (engine, directory)
    }

    #[tokio::test]
    async fn removes_everything_and_updates_directory() {
        let (engine, directory) = engine();

        let outcome = engine.remove_user_cascade(&UserId::new("u1")).await;

        assert!(outcome.is_success());
        for collection in Collection::ALL {
            assert_eq!(engine.store().count(collection), 0);
        }
        assert!(directory.list().is_empty());
    }

    #[tokio::test]
    async fn query_failure_deletes_nothing() {
        let (engine, directory) = engine();
        engine.store().fail_queries(Collection::Messages, "unreachable");

        let outcome = engine.remove_user_cascade(&UserId::new("u1")).await;

        assert_eq!(outcome.reasons().len(), 1);
        assert_eq!(outcome.reasons()[0].entity_type, EntityType::User);
        assert!(engine.store().deletion_log().is_empty());
        assert_eq!(directory.list().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_token_leaves_store_untouched() {
        let (engine, directory) = engine();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = engine
            .remove_user_cascade_until(&UserId::new("u1"), &cancel)
            .await;

        assert!(!outcome.is_success());
        assert_eq!(engine.store().count(Collection::Users), 1);
        assert_eq!(directory.list().len(), 1);
    }
}
