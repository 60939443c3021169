//! Document store boundary.
//!
//! The store is schema-less and offers equality lookups and idempotent
//! single-document deletes per collection. It has no foreign keys, no cascade
//! delete and no multi-collection transactions; keeping references intact is
//! the job of [`crate::cascade`].

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{DeletionAttempt, DeletionRecord, InMemoryDocumentStore};
pub use postgres::PostgresDocumentStore;
pub use r#trait::{DocumentRef, DocumentStore, StoreError};
