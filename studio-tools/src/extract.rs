//! Pulls a JSON payload out of free-form provider text.

use serde_json::Value;

use crate::call::CallContext;
use crate::error::{ToolError, ToolResult};

/// Shape of the empty default used by lenient extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonShape {
    /// Falls back to `{}`.
    Object,
    /// Falls back to `[]`.
    Array,
}

impl JsonShape {
    /// The empty value of this shape.
    #[must_use]
    pub fn empty(self) -> Value {
        match self {
            Self::Object => Value::Object(serde_json::Map::new()),
            Self::Array => Value::Array(Vec::new()),
        }
    }
}

/// What a handler does when the provider text holds no usable JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionPolicy {
    /// Fail the call with [`ToolError::ExtractionFailed`].
    Strict,
    /// Log a warning and continue with an empty value.
    Lenient(JsonShape),
}

impl ExtractionPolicy {
    /// Lenient with `[]` fallback.
    pub const LENIENT_ARRAY: Self = Self::Lenient(JsonShape::Array);
    /// Lenient with `{}` fallback.
    pub const LENIENT_OBJECT: Self = Self::Lenient(JsonShape::Object);

    /// Extracts according to the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ExtractionFailed`] under [`ExtractionPolicy::Strict`]
    /// when no JSON region parses.
    pub fn apply(self, ctx: &CallContext, text: &str) -> ToolResult<Value> {
        match (extract_json(text), self) {
            (Ok(value), _) => Ok(value),
            (Err(err), Self::Strict) => Err(err),
            (Err(err), Self::Lenient(shape)) => {
                ctx.warn(&format!("{err}; using empty default"));
                Ok(shape.empty())
            }
        }
    }
}

/// Finds the first JSON object or array embedded in `text`.
///
/// The region starts at the earliest `{` or `[` and runs to the last matching
/// closer (`}` or `]`) in the text. Prose and code fences around the region
/// are ignored.
///
/// # Errors
///
/// Returns [`ToolError::ExtractionFailed`] when no region exists or it does not
/// parse.
pub fn extract_json(text: &str) -> ToolResult<Value> {
    let Some(start) = text.find(['{', '[']) else {
        return Err(ToolError::extraction("no JSON object or array in response"));
    };
    let closer = if text[start..].starts_with('{') {
        '}'
    } else {
        ']'
    };
    let Some(end) = text.rfind(closer).filter(|end| *end > start) else {
        return Err(ToolError::extraction(format!(
            "unterminated JSON starting at byte {start}"
        )));
    };

    serde_json::from_str(&text[start..=end])
        .map_err(|err| ToolError::extraction(format!("invalid JSON: {err}")))
}
