//! Strongly-typed document identifiers.
//!
//! The document store assigns opaque string identifiers at creation time. The
//! newtypes below keep user, flat and message ids from being mixed up while
//! staying transparent on the wire.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a user document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a flat listing document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatId(String);

/// Identifier of a message document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

macro_rules! impl_document_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an identifier that came from the store.
            ///
            /// No validation happens here; use `str::parse` for untrusted input.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a fresh identifier the way the store does on insert
            /// (UUIDv7 text, time-ordered).
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                // Ids are opaque; rewriting them would address a different document.
                if s.trim() != s {
                    return Err(DomainError::invalid_id(format!(
                        "{}: '{}' has surrounding whitespace",
                        $name, s
                    )));
                }
                if s.contains('/') {
                    return Err(DomainError::invalid_id(format!(
                        "{}: '{}' contains a path separator",
                        $name, s
                    )));
                }
                Ok(Self(s.to_string()))
            }
        }
    };
}

impl_document_id!(UserId, "UserId");
impl_document_id!(FlatId, "FlatId");
impl_document_id!(MessageId, "MessageId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_surrounding_whitespace() {
        assert!(matches!(" u1".parse::<UserId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("u1\t".parse::<UserId>(), Err(DomainError::InvalidId(_))));

        let id: UserId = "u 1".parse().unwrap();
        assert_eq!(id.as_str(), "u 1");
    }

    #[test]
    fn parse_rejects_blank_and_path_like_ids() {
        assert!(matches!("   ".parse::<FlatId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("a/b".parse::<MessageId>(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_value(FlatId::new("f1")).unwrap();
        assert_eq!(json, serde_json::json!("f1"));
    }
}
