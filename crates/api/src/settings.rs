//! Process configuration read from the environment.

use flatshare_infra::{CascadeConfig, ConfigError};

pub const BIND_ADDR_VAR: &str = "FLATSHARE_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub bind_addr: String,
    /// When unset the service runs on the in-memory document store.
    pub database_url: Option<String>,
    pub cascade: CascadeConfig,
}

impl ApiSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind_addr: non_empty(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: non_empty(DATABASE_URL_VAR),
            cascade: CascadeConfig::from_lookup(&lookup)?,
        })
    }
}
