//! Configuration management for the tool servers.
//!
//! Settings are read from the process environment once at startup, while
//! provider credentials are resolved lazily through [`CredentialSource`] every
//! time a handler needs one.

#![warn(missing_docs, clippy::pedantic)]

pub mod credentials;
pub mod loader;
pub mod schema;

pub use credentials::{
    CredentialSource, ELEVENLABS_API_KEY, EnvCredentials, GEMINI_API_KEY, OPENAI_API_KEY,
    StaticCredentials,
};
pub use loader::{ConfigError, ConfigResult};
pub use schema::StudioConfig;
