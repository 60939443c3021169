use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use flatshare_core::{User, UserId};

/// Cached listing entry for one user (what an admin screen shows).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        let display_name = format!("{} {}", user.first_name, user.last_name)
            .trim()
            .to_string();
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            display_name,
            is_admin: user.is_admin,
        }
    }
}

/// Cached directory of users.
pub trait UserDirectory: Send + Sync {
    fn get(&self, user_id: &UserId) -> Option<UserSummary>;
    fn upsert(&self, summary: UserSummary);
    fn list(&self) -> Vec<UserSummary>;
    /// Drop a user from the view. Returns whether an entry was present.
    fn remove(&self, user_id: &UserId) -> bool;
}

impl<S> UserDirectory for Arc<S>
where
    S: UserDirectory + ?Sized,
{
    fn get(&self, user_id: &UserId) -> Option<UserSummary> {
        (**self).get(user_id)
    }

    fn upsert(&self, summary: UserSummary) {
        (**self).upsert(summary)
    }

    fn list(&self) -> Vec<UserSummary> {
        (**self).list()
    }

    fn remove(&self, user_id: &UserId) -> bool {
        (**self).remove(user_id)
    }
}

/// In-memory user directory, ordered by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<BTreeMap<UserId, UserSummary>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn get(&self, user_id: &UserId) -> Option<UserSummary> {
        let map = self.inner.read().ok()?;
        map.get(user_id).cloned()
    }

    fn upsert(&self, summary: UserSummary) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(summary.user_id.clone(), summary);
        }
    }

    fn list(&self) -> Vec<UserSummary> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn remove(&self, user_id: &UserId) -> bool {
        match self.inner.write() {
            Ok(mut map) => map.remove(user_id).is_some(),
            Err(_) => false,
        }
    }
}
