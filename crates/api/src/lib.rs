//! HTTP API: admin surface over the cascading user removal engine.
//!
//! Authentication happens upstream of this service; every route here assumes
//! an already-authorized admin caller.

pub mod app;
pub mod settings;
