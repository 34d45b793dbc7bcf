//! Shared error definitions for studio primitive types.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the studio crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing studio primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided trace identifier could not be parsed.
    #[error("invalid trace id: {source}")]
    InvalidTraceId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// The supplied platform name is not recognised.
    #[error("unknown platform `{name}`")]
    UnknownPlatform {
        /// The offending platform string.
        name: String,
    },
}
