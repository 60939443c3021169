//! Values passed between the cascade stages.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flatshare_core::{Collection, EntityRef, EntityType, FlatId, MessageId, UserId};

use crate::store::StoreError;

/// Resolution failure. Fatal to the cascade: nothing has been deleted yet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CascadeError {
    #[error("lookup in {collection} failed: {source}")]
    QueryFailure {
        collection: Collection,
        #[source]
        source: StoreError,
    },
}

/// Everything one user removal will delete, snapshotted at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionSet {
    /// De-duplicated union of messages sent by the user and messages on the
    /// user's flats.
    pub messages: BTreeSet<MessageId>,
    pub flats: BTreeSet<FlatId>,
    pub user: UserId,
}

impl DeletionSet {
    pub fn empty(user: UserId) -> Self {
        Self {
            messages: BTreeSet::new(),
            flats: BTreeSet::new(),
            user,
        }
    }

    /// Number of documents the cascade will try to delete.
    pub fn document_count(&self) -> usize {
        self.messages.len() + self.flats.len() + 1
    }
}

/// Cascade stage, in execution order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Messages,
    Flats,
    User,
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Stage::Messages => "messages",
            Stage::Flats => "flats",
            Stage::User => "user",
        })
    }
}

/// Why the orchestrator stopped before the user stage completed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// An earlier stage recorded at least one failed deletion.
    PriorFailures,
    Cancelled,
    DeadlineExceeded,
}

/// The stage the orchestrator declined to start, and why.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Halt {
    pub stage: Stage,
    pub reason: HaltReason,
}

/// A deletion that failed for a reason other than "already gone".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub entity: EntityRef,
    pub error: StoreError,
}

/// Result of running a deletion set through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub user_id: UserId,
    pub deleted_messages: Vec<MessageId>,
    pub deleted_flats: Vec<FlatId>,
    pub user_deleted: bool,
    pub failures: Vec<DeleteFailure>,
    pub halted: Option<Halt>,
}

impl DeletionReport {
    pub(crate) fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            deleted_messages: Vec::new(),
            deleted_flats: Vec::new(),
            user_deleted: false,
            failures: Vec::new(),
            halted: None,
        }
    }

    /// A report is complete only when the user is gone and nothing failed.
    pub fn is_complete(&self) -> bool {
        self.user_deleted && self.failures.is_empty()
    }
}

/// Why an entity is reported as not removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    /// Resolution could not read a collection; nothing was deleted.
    Query { collection: Collection, message: String },
    /// The store rejected this deletion.
    Delete { message: String },
    /// The operation was cancelled before `stage` started.
    Cancelled { stage: Stage },
    /// The deadline expired before `stage` started.
    DeadlineExceeded { stage: Stage },
}

impl core::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FailureCause::Query { collection, message } => {
                write!(f, "lookup in {collection} failed: {message}")
            }
            FailureCause::Delete { message } => write!(f, "delete failed: {message}"),
            FailureCause::Cancelled { stage } => write!(f, "cancelled before {stage} stage"),
            FailureCause::DeadlineExceeded { stage } => {
                write!(f, "deadline exceeded before {stage} stage")
            }
        }
    }
}

/// One entry of a failure outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub cause: FailureCause,
}

impl FailureReason {
    pub fn new(entity: &EntityRef, cause: FailureCause) -> Self {
        Self {
            entity_type: entity.entity_type(),
            entity_id: entity.id().to_string(),
            cause,
        }
    }
}

/// What the caller of a user removal gets back.
///
/// `Failure` means "removal incomplete, retry"; a retry is safe because every
/// step is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reasons", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure(Vec<FailureReason>),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn reasons(&self) -> &[FailureReason] {
        match self {
            Outcome::Success => &[],
            Outcome::Failure(reasons) => reasons,
        }
    }
}
