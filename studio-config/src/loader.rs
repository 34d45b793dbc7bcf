//! Environment loader for [`StudioConfig`].

use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;

use thiserror::Error;

use crate::schema::StudioConfig;

/// Overrides the artifact output directory.
pub const OUTPUT_DIR_ENV: &str = "STUDIO_OUTPUT_DIR";
/// Overrides the Gemini model identifier.
pub const GEMINI_MODEL_ENV: &str = "STUDIO_GEMINI_MODEL";
/// Overrides the provider deadline, in whole seconds.
pub const PROVIDER_TIMEOUT_ENV: &str = "STUDIO_PROVIDER_TIMEOUT_SECS";
/// Overrides the concurrent call limit.
pub const MAX_CONCURRENCY_ENV: &str = "STUDIO_MAX_CONCURRENCY";
/// Log filter directive; falls back to `RUST_LOG`.
pub const LOG_FILTER_ENV: &str = "STUDIO_LOG";
/// Optional plain-text log file.
pub const LOG_FILE_ENV: &str = "STUDIO_LOG_FILE";

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was present but could not be parsed.
    #[error("invalid value `{value}` for {name}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl StudioConfig {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric variable is malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a numeric variable is malformed.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(OUTPUT_DIR_ENV) {
            config = config.with_output_dir(dir);
        }
        if let Some(model) = get(GEMINI_MODEL_ENV) {
            config = config.with_gemini_model(model.trim());
        }
        if let Some(raw) = get(PROVIDER_TIMEOUT_ENV) {
            let secs = parse_positive(PROVIDER_TIMEOUT_ENV, &raw)?;
            let secs = u64::try_from(secs.get()).unwrap_or(u64::MAX);
            config = config.with_provider_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = get(MAX_CONCURRENCY_ENV) {
            let limit = parse_positive(MAX_CONCURRENCY_ENV, &raw)?;
            config = config.with_max_concurrency(limit);
        }
        if let Some(filter) = get(LOG_FILTER_ENV).or_else(|| get("RUST_LOG")) {
            config = config.with_log_filter(filter);
        }
        if let Some(path) = get(LOG_FILE_ENV) {
            config = config.with_log_file(path);
        }

        Ok(config)
    }
}

fn parse_positive(name: &'static str, raw: &str) -> ConfigResult<NonZeroUsize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| ConfigError::InvalidValue {
            name,
            value: raw.to_owned(),
            reason: "expected a positive integer",
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = StudioConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StudioConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = StudioConfig::from_lookup(lookup(&[
            (OUTPUT_DIR_ENV, "/srv/studio"),
            (GEMINI_MODEL_ENV, "gemini-1.5-pro"),
            (PROVIDER_TIMEOUT_ENV, "15"),
            (MAX_CONCURRENCY_ENV, "4"),
            (LOG_FILTER_ENV, "debug"),
            (LOG_FILE_ENV, "/var/log/studio.log"),
        ]))
        .unwrap();

        assert_eq!(config.output_dir(), Path::new("/srv/studio"));
        assert_eq!(config.gemini_model(), "gemini-1.5-pro");
        assert_eq!(config.provider_timeout(), Duration::from_secs(15));
        assert_eq!(config.max_concurrency().get(), 4);
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.log_file(), Some(Path::new("/var/log/studio.log")));
    }

    #[test]
    fn rust_log_is_a_fallback_filter() {
        let config = StudioConfig::from_lookup(lookup(&[("RUST_LOG", "warn")])).unwrap();
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = StudioConfig::from_lookup(lookup(&[(PROVIDER_TIMEOUT_ENV, "0")]))
            .expect_err("zero timeout");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name, .. } if name == PROVIDER_TIMEOUT_ENV
        ));
    }

    #[test]
    fn rejects_non_numeric_concurrency() {
        let err = StudioConfig::from_lookup(lookup(&[(MAX_CONCURRENCY_ENV, "lots")]))
            .expect_err("non numeric");
        assert!(matches!(err, ConfigError::InvalidValue { value, .. } if value == "lots"));
    }
}
