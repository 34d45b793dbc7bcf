//! Growth tool server.
//!
//! Tools: `optimize_seo`, `generate_thumbnail_concepts`,
//! `optimize_posting_schedule`, `repurpose_content` and `create_ab_test`.
//! The posting schedule is computed locally; everything else asks the text
//! model and extracts leniently.

#![warn(missing_docs, clippy::pedantic)]

pub mod repurpose;
pub mod schedule;
pub mod seo;
pub mod thumbnails;

use serde_json::{Map, Value};
use studio_kernel::{ServerInfo, StudioContext, bind};
use studio_tools::{CallContext, ToolRegistry, ToolResult};

/// Identity reported to clients.
pub const SERVER_INFO: ServerInfo = ServerInfo {
    name: "studio-growth",
    version: env!("CARGO_PKG_VERSION"),
};

/// Builds the registry in discovery order.
///
/// # Errors
///
/// Returns a registration error if a descriptor is malformed or duplicated.
pub fn registry(studio: &StudioContext) -> ToolResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register_tool(seo::descriptor()?, bind(studio, seo::run))?;
    registry.register_tool(thumbnails::descriptor()?, bind(studio, thumbnails::run))?;
    registry.register_tool(schedule::descriptor()?, bind(studio, schedule::run))?;
    registry.register_tool(repurpose::descriptor()?, bind(studio, repurpose::run))?;
    registry.register_tool(ab_test::descriptor()?, bind(studio, ab_test::run))?;
    Ok(registry)
}

/// Keeps objects; anything else becomes `{}`.
fn object_or_empty(ctx: &CallContext, value: Value) -> Value {
    if value.is_object() {
        value
    } else {
        ctx.warn("expected a JSON object, returning an empty one");
        Value::Object(Map::new())
    }
}

/// Accepts a bare array or an object wrapping one under `key`.
fn list_under(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_array) => {
            map.remove(key).unwrap_or_default()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use studio_primitives::TraceId;
    use studio_telemetry::RecordingCallLog;

    use super::*;

    #[test]
    fn non_objects_are_replaced() {
        let log = Arc::new(RecordingCallLog::new());
        let ctx = CallContext::new(TraceId::random(), "optimize_seo", log.clone());
        assert_eq!(object_or_empty(&ctx, json!({"a": 1})), json!({"a": 1}));
        assert_eq!(object_or_empty(&ctx, json!([1])), json!({}));
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn wrapped_lists() {
        assert_eq!(list_under(json!({"variants": [1]}), "variants"), json!([1]));
        assert_eq!(list_under(json!({"variants": 1}), "variants"), json!({"variants": 1}));
    }
}
