//! Strongly typed server settings.

use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// Default Gemini model used for text generation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
/// Default upper bound on any single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);
/// Default number of tool calls processed concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 32;
/// Default `EnvFilter` directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings shared by every adapter process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StudioConfig {
    output_dir: PathBuf,
    gemini_model: String,
    #[serde(with = "duration_secs")]
    provider_timeout: Duration,
    max_concurrency: NonZeroUsize,
    log_filter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_file: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            output_dir: env::temp_dir().join("creator-studio"),
            gemini_model: DEFAULT_GEMINI_MODEL.to_owned(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            max_concurrency: NonZeroUsize::new(DEFAULT_MAX_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_file: None,
        }
    }
}

impl StudioConfig {
    /// Sets the directory generated artifacts are written to.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the Gemini model identifier.
    #[must_use]
    pub fn with_gemini_model(mut self, model: impl Into<String>) -> Self {
        self.gemini_model = model.into();
        self
    }

    /// Sets the deadline applied to every provider call.
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Sets the concurrent call limit.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: NonZeroUsize) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Sets the log filter directive.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Sets an additional plain-text log file.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Directory generated artifacts are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Gemini model identifier.
    #[must_use]
    pub fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    /// Deadline applied to every provider call.
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        self.provider_timeout
    }

    /// Concurrent call limit.
    #[must_use]
    pub const fn max_concurrency(&self) -> NonZeroUsize {
        self.max_concurrency
    }

    /// Log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Optional plain-text log file.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}
