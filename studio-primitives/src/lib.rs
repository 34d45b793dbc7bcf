//! Core shared types for the creator studio tool servers.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;
mod platform;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Per-call correlation identifier.
pub use ids::TraceId;
/// Publishing and trend platforms known to the tool servers.
pub use platform::Platform;
