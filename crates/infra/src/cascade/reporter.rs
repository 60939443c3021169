//! Turns a deletion report into the caller-facing outcome and keeps the
//! locally cached user directory consistent with it.

use tracing::info;

use flatshare_core::{EntityRef, UserId};

use super::types::{
    CascadeError, DeletionReport, FailureCause, FailureReason, HaltReason, Outcome,
};
use crate::view::UserDirectory;

/// Map a report to an outcome without touching any view.
pub fn outcome_of(report: &DeletionReport) -> Outcome {
    if report.is_complete() {
        return Outcome::Success;
    }

    let mut reasons: Vec<FailureReason> = report
        .failures
        .iter()
        .map(|f| {
            FailureReason::new(
                &f.entity,
                FailureCause::Delete {
                    message: f.error.to_string(),
                },
            )
        })
        .collect();

    // Cancellation and deadline halts have no per-entity failure to point at,
    // so they are attributed to the user the cascade did not reach.
    if let Some(halt) = report.halted {
        let cause = match halt.reason {
            HaltReason::PriorFailures => None,
            HaltReason::Cancelled => Some(FailureCause::Cancelled { stage: halt.stage }),
            HaltReason::DeadlineExceeded => Some(FailureCause::DeadlineExceeded { stage: halt.stage }),
        };
        if let Some(cause) = cause {
            reasons.push(FailureReason::new(&EntityRef::User(report.user_id.clone()), cause));
        }
    }

    Outcome::Failure(reasons)
}

/// Map a report to an outcome and, on success only, drop the user from the
/// cached directory.
pub fn report(report: &DeletionReport, directory: Option<&dyn UserDirectory>) -> Outcome {
    let outcome = outcome_of(report);

    match &outcome {
        Outcome::Success => {
            if let Some(directory) = directory {
                directory.remove(&report.user_id);
            }
            info!(
                user_id = %report.user_id,
                messages = report.deleted_messages.len(),
                flats = report.deleted_flats.len(),
                "user removed"
            );
        }
        Outcome::Failure(reasons) => {
            info!(
                user_id = %report.user_id,
                failures = reasons.len(),
                "user removal incomplete"
            );
        }
    }

    outcome
}

/// Outcome for a cascade that never got past resolution.
pub fn resolution_failed(user_id: &UserId, err: &CascadeError) -> Outcome {
    let CascadeError::QueryFailure { collection, source } = err;
    Outcome::Failure(vec![FailureReason::new(
        &EntityRef::User(user_id.clone()),
        FailureCause::Query {
            collection: *collection,
            message: source.to_string(),
        },
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatshare_core::{Collection, EntityType, MessageId};

    use crate::cascade::types::{DeleteFailure, Halt, Stage};
    use crate::store::StoreError;
    use crate::view::{InMemoryUserDirectory, UserSummary};

    fn directory_with(id: &str) -> InMemoryUserDirectory {
        let dir = InMemoryUserDirectory::new();
        dir.upsert(UserSummary {
            user_id: UserId::new(id),
            email: format!("{id}@example.com"),
            display_name: id.to_string(),
            is_admin: false,
        });
        dir
    }

    fn complete_report() -> DeletionReport {
        let mut r = DeletionReport::new(UserId::new("u1"));
        r.user_deleted = true;
        r
    }

    #[test]
    fn complete_report_is_success_and_updates_view() {
        let dir = directory_with("u1");
        let outcome = report(&complete_report(), Some(&dir));

        assert_eq!(outcome, Outcome::Success);
        assert!(dir.get(&UserId::new("u1")).is_none());
    }

    #[test]
    fn partial_failure_lists_every_failed_entity_and_keeps_view() {
        let dir = directory_with("u1");
        let mut r = DeletionReport::new(UserId::new("u1"));
        for id in ["m1", "m2"] {
            r.failures.push(DeleteFailure {
                entity: EntityRef::Message(MessageId::new(id)),
                error: StoreError::Backend("throttled".to_string()),
            });
        }
        r.halted = Some(Halt {
            stage: Stage::Flats,
            reason: HaltReason::PriorFailures,
        });

        let outcome = report(&r, Some(&dir));

        let reasons = outcome.reasons();
        assert_eq!(reasons.len(), 2);
        assert!(reasons.iter().all(|r| r.entity_type == EntityType::Message));
        assert_eq!(reasons[0].entity_id, "m1");
        assert!(dir.get(&UserId::new("u1")).is_some());
    }

    #[test]
    fn cancelled_run_is_attributed_to_the_user() {
        let mut r = DeletionReport::new(UserId::new("u1"));
        r.halted = Some(Halt {
            stage: Stage::User,
            reason: HaltReason::Cancelled,
        });

        let outcome = outcome_of(&r);

        assert_eq!(
            outcome.reasons(),
            &[FailureReason {
                entity_type: EntityType::User,
                entity_id: "u1".to_string(),
                cause: FailureCause::Cancelled { stage: Stage::User },
            }]
        );
    }

    #[test]
    fn expired_deadline_is_attributed_to_the_user_and_keeps_view() {
        let dir = directory_with("u1");
        let mut r = DeletionReport::new(UserId::new("u1"));
        r.deleted_messages.push(MessageId::new("m1"));
        r.halted = Some(Halt {
            stage: Stage::Flats,
            reason: HaltReason::DeadlineExceeded,
        });

        let outcome = report(&r, Some(&dir));

        assert_eq!(
            outcome.reasons(),
            &[FailureReason {
                entity_type: EntityType::User,
                entity_id: "u1".to_string(),
                cause: FailureCause::DeadlineExceeded { stage: Stage::Flats },
            }]
        );
        assert!(dir.get(&UserId::new("u1")).is_some());
    }

    #[test]
    fn resolution_failure_names_the_collection() {
        let err = CascadeError::QueryFailure {
            collection: Collection::Messages,
            source: StoreError::Unavailable("pool timed out".to_string()),
        };

        let outcome = resolution_failed(&UserId::new("u1"), &err);

        match &outcome.reasons()[0].cause {
            FailureCause::Query { collection, .. } => assert_eq!(*collection, Collection::Messages),
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[test]
    fn outcome_serializes_for_callers() {
        let outcome = Outcome::Failure(vec![FailureReason {
            entity_type: EntityType::Flat,
            entity_id: "f1".to_string(),
            cause: FailureCause::Delete {
                message: "boom".to_string(),
            },
        }]);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["reasons"][0]["entity_type"], "flat");
        assert_eq!(json["reasons"][0]["cause"]["kind"], "delete");
        assert_eq!(serde_json::to_value(Outcome::Success).unwrap()["outcome"], "success");
    }
}
