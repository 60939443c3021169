//! Dependency resolution: which documents transitively depend on a user.

use std::collections::BTreeSet;

use futures::future::try_join_all;
use tracing::debug;

use flatshare_core::{fields, Collection, FlatId, MessageId, UserId};

use super::types::{CascadeError, DeletionSet};
use crate::store::{DocumentRef, DocumentStore};

/// Compute the deletion set for `user_id`.
///
/// Read-only. The user's own existence is not checked: a missing user
/// resolves to empty dependent sets. Any failed lookup aborts resolution.
pub async fn resolve<S>(store: &S, user_id: &UserId) -> Result<DeletionSet, CascadeError>
where
    S: DocumentStore + ?Sized,
{
    let (sent, owned) = futures::try_join!(
        lookup(store, Collection::Messages, fields::SENDER_ID, user_id.as_str()),
        lookup(store, Collection::Flats, fields::OWNER_ID, user_id.as_str()),
    )?;

    let flats: BTreeSet<FlatId> = owned.into_iter().map(|doc| FlatId::new(doc.id)).collect();

    let on_owned_flats = try_join_all(
        flats
            .iter()
            .map(|flat| lookup(store, Collection::Messages, fields::FLAT_ID, flat.as_str())),
    )
    .await?;

    // A message the user sent about their own flat shows up in both lookups.
    let messages: BTreeSet<MessageId> = sent
        .into_iter()
        .chain(on_owned_flats.into_iter().flatten())
        .map(|doc| MessageId::new(doc.id))
        .collect();

    debug!(
        user_id = %user_id,
        messages = messages.len(),
        flats = flats.len(),
        "resolved deletion set"
    );

    Ok(DeletionSet {
        messages,
        flats,
        user: user_id.clone(),
    })
}

async fn lookup<S>(
    store: &S,
    collection: Collection,
    field: &str,
    value: &str,
) -> Result<Vec<DocumentRef>, CascadeError>
where
    S: DocumentStore + ?Sized,
{
    store
        .query_by_field(collection, field, value)
        .await
        .map_err(|source| CascadeError::QueryFailure { collection, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryDocumentStore, StoreError};
    use serde_json::json;

    fn message(store: &InMemoryDocumentStore, id: &str, sender: &str, flat: &str) {
        store
            .insert_raw(
                Collection::Messages,
                id,
                json!({ "id": id, "senderId": sender, "flatID": flat }),
            )
            .unwrap();
    }

    fn flat(store: &InMemoryDocumentStore, id: &str, owner: &str) {
        store
            .insert_raw(Collection::Flats, id, json!({ "id": id, "ownerID": owner }))
            .unwrap();
    }

    #[tokio::test]
    async fn collects_sent_messages_owned_flats_and_their_messages() {
        let store = InMemoryDocumentStore::new();
        flat(&store, "f1", "u1");
        flat(&store, "f2", "u1");
        flat(&store, "f3", "u2");
        message(&store, "m1", "u1", "f3");
        message(&store, "m2", "u2", "f1");
        message(&store, "m3", "u1", "f1");
        message(&store, "m4", "u2", "f3");

        let set = resolve(&store, &UserId::new("u1")).await.unwrap();

        let messages: Vec<_> = set.messages.iter().map(MessageId::as_str).collect();
        let flats: Vec<_> = set.flats.iter().map(FlatId::as_str).collect();
        assert_eq!(messages, vec!["m1", "m2", "m3"]);
        assert_eq!(flats, vec!["f1", "f2"]);
        assert_eq!(set.user, UserId::new("u1"));
    }

    #[tokio::test]
    async fn message_matching_both_lookups_is_listed_once() {
        let store = InMemoryDocumentStore::new();
        flat(&store, "f1", "u1");
        message(&store, "m3", "u1", "f1");

        let set = resolve(&store, &UserId::new("u1")).await.unwrap();
        assert_eq!(set.messages.len(), 1);
        assert_eq!(set.document_count(), 3);
    }

    #[tokio::test]
    async fn unknown_user_resolves_to_user_only() {
        let store = InMemoryDocumentStore::new();
        let set = resolve(&store, &UserId::new("ghost")).await.unwrap();
        assert_eq!(set, DeletionSet::empty(UserId::new("ghost")));
    }

    #[tokio::test]
    async fn failed_lookup_aborts_with_collection() {
        let store = InMemoryDocumentStore::new();
        flat(&store, "f1", "u1");
        store.fail_queries(Collection::Flats, "replica lag");

        let err = resolve(&store, &UserId::new("u1")).await.unwrap_err();
        assert_eq!(
            err,
            CascadeError::QueryFailure {
                collection: Collection::Flats,
                source: StoreError::Backend("replica lag".to_string()),
            }
        );
        assert!(store.deletion_log().is_empty());
    }
}
