//! Collections, foreign-key-like field names, and typed entity references.

use serde::{Deserialize, Serialize};

use crate::id::{FlatId, MessageId, UserId};

/// Field names the store documents use to reference other documents.
///
/// The store has no foreign keys; these are plain string fields matched by
/// equality lookups.
pub mod fields {
    /// `messages.senderId` → `users.id`
    pub const SENDER_ID: &str = "senderId";
    /// `messages.flatID` → `flats.id`
    pub const FLAT_ID: &str = "flatID";
    /// `flats.ownerID` → `users.id`
    pub const OWNER_ID: &str = "ownerID";
}

/// Top-level collection of the document store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Flats,
    Messages,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Flats, Collection::Messages];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Flats => "flats",
            Collection::Messages => "messages",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity, as reported back to callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    User,
    Flat,
    Message,
}

impl EntityType {
    /// Collection documents of this kind are stored in.
    pub fn collection(&self) -> Collection {
        match self {
            EntityType::User => Collection::Users,
            EntityType::Flat => Collection::Flats,
            EntityType::Message => Collection::Messages,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Flat => "flat",
            EntityType::Message => "message",
        }
    }
}

impl core::fmt::Display for EntityType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a single stored entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityRef {
    User(UserId),
    Flat(FlatId),
    Message(MessageId),
}

impl EntityRef {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityRef::User(_) => EntityType::User,
            EntityRef::Flat(_) => EntityType::Flat,
            EntityRef::Message(_) => EntityType::Message,
        }
    }

    pub fn collection(&self) -> Collection {
        self.entity_type().collection()
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRef::User(id) => id.as_str(),
            EntityRef::Flat(id) => id.as_str(),
            EntityRef::Message(id) => id.as_str(),
        }
    }
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.collection(), self.id())
    }
}

impl From<UserId> for EntityRef {
    fn from(value: UserId) -> Self {
        EntityRef::User(value)
    }
}

impl From<FlatId> for EntityRef {
    fn from(value: FlatId) -> Self {
        EntityRef::Flat(value)
    }
}

impl From<MessageId> for EntityRef {
    fn from(value: MessageId) -> Self {
        EntityRef::Message(value)
    }
}
