//! `flatshare-core`: rental listing domain building blocks.
//!
//! This crate contains **pure domain** types (no storage or transport concerns):
//! document identifiers, the stored document shapes, and the collection names the
//! document store keys them under.

pub mod collection;
pub mod document;
pub mod entity;
pub mod error;
pub mod id;

pub use collection::{fields, Collection, EntityRef, EntityType};
pub use document::{Flat, Message, User};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{FlatId, MessageId, UserId};
