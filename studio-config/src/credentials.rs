//! Named provider credentials.

use std::collections::HashMap;
use std::env;
use std::fmt;

/// Credential consumed by the generative-text provider.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Credential consumed by the `ElevenLabs` speech provider.
pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
/// Credential consumed by the `OpenAI` speech provider.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Resolves named credentials at call time.
pub trait CredentialSource: Send + Sync {
    /// Returns the credential value, or `None` when it is absent or blank.
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment on every lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn resolve(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }
}

/// In-memory credential table.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("StaticCredentials")
            .field("names", &names)
            .finish()
    }
}

impl StaticCredentials {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn resolve(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}
