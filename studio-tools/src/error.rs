//! Failure taxonomy shared by every tool server.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// One violated argument constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Field path, e.g. `platforms[1]` or `scenes[0].title`.
    pub path: String,
    /// Machine-readable rule name (`required`, `type`, `enum`, `minimum`, ...).
    pub rule: &'static str,
    /// Human-readable detail.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(path: impl Into<String>, rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} ({})", self.message, self.rule)
        } else {
            write!(f, "{}: {} ({})", self.path, self.message, self.rule)
        }
    }
}

struct Joined<'a>(&'a [Violation]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, violation) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Errors produced by registration, validation and tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed schema validation.
    #[error("invalid arguments: {}", Joined(violations))]
    SchemaViolation {
        /// Every violated constraint.
        violations: Vec<Violation>,
    },

    /// A credential or setting required by the call is missing.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is missing.
        reason: String,
    },

    /// Requested tool does not exist.
    #[error("unknown tool `{name}`")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },

    /// An external provider failed or timed out.
    #[error("{provider} request failed: {reason}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Rendered provider error.
        reason: String,
    },

    /// The provider answered but no usable JSON could be extracted.
    #[error("failed to extract JSON from provider response: {reason}")]
    ExtractionFailed {
        /// Why extraction failed.
        reason: String,
    },

    /// Tool execution failed locally (for example while writing an artifact).
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },

    /// Tool name collided with an existing registration.
    #[error("tool `{name}` is already registered")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },

    /// Tool descriptor failed validation.
    #[error("invalid tool descriptor: {reason}")]
    InvalidDescriptor {
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl ToolError {
    /// Creates a schema violation with a single entry.
    #[must_use]
    pub fn violation(path: impl Into<String>, rule: &'static str, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            violations: vec![Violation::new(path, rule, message)],
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Creates a provider error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Provider {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an extraction error.
    #[must_use]
    pub fn extraction(reason: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            reason: reason.into(),
        }
    }

    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Returns the violations carried by a schema error, if any.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaViolation { violations } => violations,
            _ => &[],
        }
    }
}
