//! Stored document shapes.
//!
//! Field names follow the store's camelCase convention; the three reference
//! fields (`ownerID`, `senderId`, `flatID`) keep their historical spelling
//! because lookups match on them verbatim.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::entity::Entity;
use crate::id::{FlatId, MessageId, UserId};

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Credential material as written by the auth collaborator (never plain text).
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub favorite_flats: BTreeSet<FlatId>,
}

/// Rental listing owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flat {
    pub id: FlatId,
    #[serde(rename = "ownerID")]
    pub owner_id: UserId,
    pub ad_title: String,
    pub city: String,
    pub street_name: String,
    pub street_number: u32,
    /// Square metres.
    pub area_size: u32,
    pub year_built: u16,
    /// Monthly rent in whole currency units.
    pub rent_price: u32,
    pub date_available: NaiveDate,
    #[serde(rename = "hasAC", default)]
    pub has_ac: bool,
    /// Location of the uploaded image, if any.
    #[serde(default)]
    pub image: Option<String>,
}

/// Message sent by a user about a flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    #[serde(rename = "flatID")]
    pub flat_id: FlatId,
    #[serde(default)]
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Flat {
    type Id = FlatId;
    const COLLECTION: Collection = Collection::Flats;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Entity for Message {
    type Id = MessageId;
    const COLLECTION: Collection = Collection::Messages;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
