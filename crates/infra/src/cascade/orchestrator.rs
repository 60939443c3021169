//! Staged deletion: messages, then flats, then the user.
//!
//! Stage order guarantees that an interrupted cascade never leaves a surviving
//! document pointing at a deleted one. Within a stage every deletion is
//! independent, so the stage fans out and then waits for all of them.

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use flatshare_core::EntityRef;

use super::types::{DeleteFailure, DeletionReport, DeletionSet, Halt, HaltReason, Stage};
use crate::config::CascadeConfig;
use crate::store::{DocumentStore, StoreError};

/// Execute a resolved deletion set.
///
/// Never returns early on a failed deletion: failures are collected into the
/// report, sibling deletions in the same stage still run, and no later stage
/// is started. Cancellation and the configured deadline are checked only
/// between stages.
pub async fn execute<S>(
    store: &S,
    set: &DeletionSet,
    config: &CascadeConfig,
    cancel: &CancellationToken,
) -> DeletionReport
where
    S: DocumentStore + ?Sized,
{
    let deadline = config.deadline.map(|d| Instant::now() + d);
    let mut report = DeletionReport::new(set.user.clone());

    let stages = [
        (
            Stage::Messages,
            set.messages.iter().cloned().map(EntityRef::Message).collect::<Vec<_>>(),
        ),
        (
            Stage::Flats,
            set.flats.iter().cloned().map(EntityRef::Flat).collect(),
        ),
        (Stage::User, vec![EntityRef::User(set.user.clone())]),
    ];

    for (stage, targets) in stages {
        if let Some(reason) = halt_reason(&report, deadline, cancel) {
            warn!(user_id = %set.user, %stage, ?reason, "cascade halted");
            report.halted = Some(Halt { stage, reason });
            break;
        }

        debug!(user_id = %set.user, %stage, count = targets.len(), "starting stage");

        for (entity, result) in run_stage(store, targets, config.max_concurrent_deletes).await {
            match result {
                Ok(()) => record_deleted(&mut report, entity),
                Err(error) => {
                    warn!(%stage, entity = %entity, error = %error, "deletion failed");
                    report.failures.push(DeleteFailure { entity, error });
                }
            }
        }
    }

    report
}

fn halt_reason(
    report: &DeletionReport,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> Option<HaltReason> {
    if !report.failures.is_empty() {
        return Some(HaltReason::PriorFailures);
    }
    if cancel.is_cancelled() {
        return Some(HaltReason::Cancelled);
    }
    match deadline {
        Some(at) if Instant::now() >= at => Some(HaltReason::DeadlineExceeded),
        _ => None,
    }
}

fn record_deleted(report: &mut DeletionReport, entity: EntityRef) {
    match entity {
        EntityRef::Message(id) => report.deleted_messages.push(id),
        EntityRef::Flat(id) => report.deleted_flats.push(id),
        EntityRef::User(_) => report.user_deleted = true,
    }
}

/// Delete every target and wait until all of them settle.
///
/// `NotFound` counts as deleted so concurrent or repeated cascades stay
/// idempotent.
async fn run_stage<S>(
    store: &S,
    targets: Vec<EntityRef>,
    max_in_flight: Option<usize>,
) -> Vec<(EntityRef, Result<(), StoreError>)>
where
    S: DocumentStore + ?Sized,
{
    let deletions = targets.into_iter().map(|entity| async move {
        let result = match store.delete_document(entity.collection(), entity.id()).await {
            Err(StoreError::NotFound { .. }) => {
                debug!(entity = %entity, "already gone");
                Ok(())
            }
            other => other,
        };
        (entity, result)
    });

    match max_in_flight {
        Some(limit) => {
            stream::iter(deletions)
                .buffer_unordered(limit.max(1))
                .collect::<Vec<_>>()
                .await
        }
        None => join_all(deletions).await,
    }
}
