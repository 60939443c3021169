//! Locally held views of stored entities.
//!
//! Views are caches: the document store stays the source of truth, and the
//! cascade reporter only ever removes an entry after a fully successful
//! removal.

pub mod user_directory;

pub use user_directory::{InMemoryUserDirectory, UserDirectory, UserSummary};
