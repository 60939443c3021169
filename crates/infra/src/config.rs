//! Cascade configuration loading and representation.

use std::time::Duration;

use thiserror::Error;

pub const DEADLINE_VAR: &str = "FLATSHARE_CASCADE_DEADLINE_MS";
pub const MAX_CONCURRENT_VAR: &str = "FLATSHARE_CASCADE_MAX_CONCURRENT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Tuning knobs for the cascade orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeConfig {
    /// Overall budget for one cascade. Once exceeded, no further stage is
    /// started; deletions already in flight are left to settle.
    pub deadline: Option<Duration>,
    /// Cap on in-flight deletions within a stage. `None` issues the whole
    /// stage at once.
    pub max_concurrent_deletes: Option<usize>,
}

impl CascadeConfig {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_concurrent_deletes(mut self, max: usize) -> Self {
        self.max_concurrent_deletes = Some(max.max(1));
        self
    }

    /// Load from `FLATSHARE_CASCADE_DEADLINE_MS` / `FLATSHARE_CASCADE_MAX_CONCURRENT`.
    ///
    /// Unset or empty variables keep the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`CascadeConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = positive_number(DEADLINE_VAR, lookup(DEADLINE_VAR))? {
            config.deadline = Some(Duration::from_millis(ms));
        }
        if let Some(max) = positive_number(MAX_CONCURRENT_VAR, lookup(MAX_CONCURRENT_VAR))? {
            config.max_concurrent_deletes = Some(usize::try_from(max).unwrap_or(usize::MAX));
        }

        Ok(config)
    }
}

fn positive_number(var: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::InvalidNumber { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = CascadeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CascadeConfig::default());
    }

    #[test]
    fn reads_deadline_and_concurrency() {
        let config = CascadeConfig::from_lookup(lookup(&[
            (DEADLINE_VAR, "1500"),
            (MAX_CONCURRENT_VAR, " 8 "),
        ]))
        .unwrap();

        assert_eq!(config.deadline, Some(Duration::from_millis(1500)));
        assert_eq!(config.max_concurrent_deletes, Some(8));
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let err = CascadeConfig::from_lookup(lookup(&[(MAX_CONCURRENT_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { var: MAX_CONCURRENT_VAR, .. }));

        assert!(CascadeConfig::from_lookup(lookup(&[(DEADLINE_VAR, "soon")])).is_err());
    }

    #[test]
    fn builder_clamps_concurrency_to_one() {
        let config = CascadeConfig::default().with_max_concurrent_deletes(0);
        assert_eq!(config.max_concurrent_deletes, Some(1));
    }
}
