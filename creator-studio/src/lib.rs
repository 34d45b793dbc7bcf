//! Creator tool servers facade.
//!
//! Bundles the workspace crates behind feature flags. Each server crate
//! (`ideas`, `scripts`, `growth`) exposes a `registry` function and ships a
//! stdio binary of the same name.

#![warn(missing_docs, clippy::pedantic)]

/// Shared primitives.
pub use studio_primitives as primitives;

/// Environment-driven settings and credentials (enabled by `config` feature).
#[cfg(feature = "config")]
pub use studio_config as config;

/// Call logging and subscriber setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use studio_telemetry as telemetry;

/// Prompt templates and platform tables (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use studio_prompts as prompts;

/// Text, speech and trend providers (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use studio_adapters as adapters;

/// Schemas, registry and dispatcher (enabled by `tools` feature).
#[cfg(feature = "tools")]
pub use studio_tools as tools;

/// Shared context and stdio server (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use studio_kernel as kernel;

/// Idea-generation server (enabled by `ideas` feature).
#[cfg(feature = "ideas")]
pub use studio_ideas as ideas;

/// Script-production server (enabled by `scripts` feature).
#[cfg(feature = "scripts")]
pub use studio_scripts as scripts;

/// Growth-optimization server (enabled by `growth` feature).
#[cfg(feature = "growth")]
pub use studio_growth as growth;
