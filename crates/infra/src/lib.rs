//! Infrastructure layer: document store adapters, cached views, configuration,
//! and the cascading user removal engine built on top of them.

pub mod cascade;
pub mod config;
pub mod store;
pub mod view;


pub use cascade::{CascadeEngine, Outcome};
pub use config::{CascadeConfig, ConfigError};
