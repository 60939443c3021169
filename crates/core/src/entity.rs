//! Entity trait: a typed document with identity, living in one collection.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;

use crate::collection::Collection;
use crate::error::{DomainError, DomainResult};

/// Stored document marker + minimal interface.
pub trait Entity: Serialize + DeserializeOwned {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + AsRef<str>;

    /// Collection the document is stored in.
    const COLLECTION: Collection;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Serialize into the schema-less JSON body the store persists.
    fn to_document(&self) -> DomainResult<JsonValue> {
        serde_json::to_value(self).map_err(|e| DomainError::serialization(e.to_string()))
    }

    /// Rebuild a typed entity from a stored JSON body.
    fn from_document(body: JsonValue) -> DomainResult<Self> {
        serde_json::from_value(body).map_err(|e| DomainError::serialization(e.to_string()))
    }
}
