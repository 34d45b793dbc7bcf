//! Uniform reply wrapper returned for every tool call.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use studio_primitives::TraceId;

use crate::error::ToolError;

/// One content item of an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Pretty-printed JSON payload.
    pub text: String,
}

/// `{content: [{type: "text", text}], isError?: true}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Exactly one text item.
    pub content: Vec<ContentItem>,
    /// Present and `true` only for failures.
    #[serde(rename = "isError", default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ResponseEnvelope {
    fn text(text: String, is_error: Option<bool>) -> Self {
        Self {
            content: vec![ContentItem {
                kind: "text".to_owned(),
                text,
            }],
            is_error,
        }
    }

    /// Wraps a successful result.
    #[must_use]
    pub fn success(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text, None)
    }

    /// Wraps a failure as `{error, traceId}`.
    #[must_use]
    pub fn failure(error: &ToolError, trace_id: TraceId) -> Self {
        let body = json!({
            "error": error.to_string(),
            "traceId": trace_id.to_string(),
        });
        let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
        Self::text(text, Some(true))
    }

    /// Whether this envelope reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Parses the first text item back into JSON.
    #[must_use]
    pub fn payload(&self) -> Option<Value> {
        self.content
            .first()
            .and_then(|item| serde_json::from_str(&item.text).ok())
    }
}
