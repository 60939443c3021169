use serde::Serialize;

use flatshare_core::{FlatId, MessageId, UserId};
use flatshare_infra::cascade::{DeletionSet, FailureReason};
use flatshare_infra::view::UserSummary;

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserList {
    pub items: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct Dependents {
    pub user_id: UserId,
    pub messages: Vec<MessageId>,
    pub flats: Vec<FlatId>,
}

impl From<DeletionSet> for Dependents {
    fn from(set: DeletionSet) -> Self {
        Self {
            user_id: set.user,
            messages: set.messages.into_iter().collect(),
            flats: set.flats.into_iter().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemovalIncomplete {
    pub error: &'static str,
    pub message: &'static str,
    pub reasons: Vec<FailureReason>,
}
