use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::task::JoinError;
use tracing::{info, warn};

use flatshare_core::{Entity, User, UserId};
use flatshare_infra::{
    cascade::{CascadeEngine, CascadeError, DeletionSet, Outcome},
    config::CascadeConfig,
    store::{DocumentRef, DocumentStore, InMemoryDocumentStore, PostgresDocumentStore},
    view::{InMemoryUserDirectory, UserDirectory, UserSummary},
};

use crate::settings::ApiSettings;

pub type SharedStore = Arc<dyn DocumentStore>;

/// Long-lived services shared by all handlers.
pub struct AppServices {
    engine: Arc<CascadeEngine<SharedStore>>,
    directory: Arc<InMemoryUserDirectory>,
}

impl AppServices {
    pub fn new(store: SharedStore, directory: Arc<InMemoryUserDirectory>, config: CascadeConfig) -> Self {
        let engine = CascadeEngine::new(store)
            .with_config(config)
            .with_directory(directory.clone());
        Self {
            engine: Arc::new(engine),
            directory,
        }
    }

    pub fn users_list(&self) -> Vec<UserSummary> {
        self.directory.list()
    }

    pub fn users_get(&self, user_id: &UserId) -> Option<UserSummary> {
        self.directory.get(user_id)
    }

    /// Preview of what removing `user_id` would delete right now.
    pub async fn dependents(&self, user_id: &UserId) -> Result<DeletionSet, CascadeError> {
        self.engine.resolve(user_id).await
    }

    /// Run the cascade on its own task.
    ///
    /// A dropped request (client disconnect) must not drop the current stage's
    /// deletions mid-flight; the spawned task always runs to an outcome.
    pub async fn remove_user(&self, user_id: &UserId) -> Result<Outcome, JoinError> {
        let engine = Arc::clone(&self.engine);
        let user_id = user_id.clone();
        tokio::spawn(async move { engine.remove_user_cascade(&user_id).await }).await
    }
}

/// Fill the directory from stored user documents, skipping bodies that do
/// not decode.
pub fn warm_directory(directory: &dyn UserDirectory, users: Vec<DocumentRef>) -> usize {
    let mut loaded = 0;
    for doc in users {
        match User::from_document(doc.body) {
            Ok(user) => {
                directory.upsert(UserSummary::from(&user));
                loaded += 1;
            }
            Err(e) => warn!(id = %doc.id, error = %e, "skipping undecodable user document"),
        }
    }
    loaded
}

pub async fn build_services(settings: &ApiSettings) -> anyhow::Result<AppServices> {
    let directory = Arc::new(InMemoryUserDirectory::new());

    let store: SharedStore = match &settings.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("could not connect to document database")?;
            let store = PostgresDocumentStore::new(pool);
            store.ensure_schema().await?;
            let users = store.list(flatshare_core::Collection::Users).await?;
            let loaded = warm_directory(directory.as_ref(), users);
            info!(users = loaded, "using postgres document store");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    Ok(AppServices::new(store, directory, settings.cascade.clone()))
}
