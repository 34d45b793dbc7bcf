//! Routes named calls to tools and renders every outcome as an envelope.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use studio_primitives::TraceId;
use studio_telemetry::CallLog;

use crate::call::CallContext;
use crate::envelope::ResponseEnvelope;
use crate::error::{ToolError, ToolResult};
use crate::registry::{ToolDescriptor, ToolRegistry};

/// Single entry point for tool calls.
///
/// Assigns a trace id, rejects unknown names before validation, validates
/// arguments, invokes the tool once and converts any failure into an error
/// envelope. Nothing escapes as a `Result`.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    log: Arc<dyn CallLog>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over a fully built registry.
    #[must_use]
    pub fn new(registry: ToolRegistry, log: Arc<dyn CallLog>) -> Self {
        Self {
            registry: Arc::new(registry),
            log,
        }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.registry.descriptors()
    }

    /// Dispatches a call under a fresh trace id.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> ResponseEnvelope {
        self.dispatch_traced(TraceId::random(), name, arguments)
            .await
    }

    /// Dispatches a call under the supplied trace id.
    pub async fn dispatch_traced(
        &self,
        trace_id: TraceId,
        name: &str,
        arguments: Value,
    ) -> ResponseEnvelope {
        let started = Instant::now();
        let ctx = CallContext::new(trace_id, name, Arc::clone(&self.log));
        ctx.info("call received");

        match self.run(ctx.clone(), name, &arguments).await {
            Ok(value) => {
                ctx.info(&format!(
                    "call succeeded in {} ms",
                    started.elapsed().as_millis()
                ));
                ResponseEnvelope::success(&value)
            }
            Err(err) => {
                ctx.error(&format!(
                    "call failed in {} ms: {err}",
                    started.elapsed().as_millis()
                ));
                ResponseEnvelope::failure(&err, trace_id)
            }
        }
    }

    async fn run(&self, ctx: CallContext, name: &str, arguments: &Value) -> ToolResult<Value> {
        let handle = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_owned(),
            })?;
        let args = handle.descriptor().schema().validate(arguments)?;
        handle.invoke(ctx, args).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use studio_telemetry::{LogLevel, RecordingCallLog};

    use super::*;
    use crate::schema::{ArgumentSchema, FieldSpec};

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl crate::registry::Tool for Counting {
        async fn invoke(&self, _ctx: CallContext, args: Value) -> ToolResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if args["count"] == 13 {
                return Err(ToolError::provider("Gemini", "boom"));
            }
            Ok(json!({"echo": args}))
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<AtomicUsize>, Arc<RecordingCallLog>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let log = Arc::new(RecordingCallLog::new());
        let mut registry = ToolRegistry::new();
        registry
            .register_tool(
                ToolDescriptor::new(
                    "count_things",
                    "Counts",
                    ArgumentSchema::new()
                        .field("niche", FieldSpec::string("").required())
                        .field("count", FieldSpec::integer("").range(1.0, 20.0).default(5)),
                )
                .unwrap(),
                Counting {
                    calls: Arc::clone(&calls),
                },
            )
            .unwrap();
        (Dispatcher::new(registry, log.clone()), calls, log)
    }

    #[tokio::test]
    async fn success_returns_normalised_args_to_tool() {
        let (dispatcher, calls, _) = dispatcher();
        let envelope = dispatcher
            .dispatch("count_things", json!({"niche": "tea"}))
            .await;
        assert!(!envelope.is_error());
        assert_eq!(envelope.payload().unwrap()["echo"]["count"], 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn schema_violation_never_reaches_the_tool() {
        let (dispatcher, calls, _) = dispatcher();
        let envelope = dispatcher
            .dispatch("count_things", json!({"niche": "tea", "count": 0}))
            .await;
        assert!(envelope.is_error());
        let error = envelope.payload().unwrap()["error"].as_str().unwrap().to_owned();
        assert!(error.contains("count"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_before_validation() {
        let (dispatcher, calls, _) = dispatcher();
        let envelope = dispatcher.dispatch("missing", Value::Null).await;
        let error = envelope.payload().unwrap()["error"].as_str().unwrap().to_owned();
        assert!(error.contains("unknown tool"));
        assert!(!error.contains("invalid arguments"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_failure_becomes_error_envelope_with_trace() {
        let (dispatcher, _, log) = dispatcher();
        let trace_id = TraceId::random();
        let envelope = dispatcher
            .dispatch_traced(trace_id, "count_things", json!({"niche": "a", "count": 13}))
            .await;
        let payload = envelope.payload().unwrap();
        assert_eq!(payload["traceId"], trace_id.to_string());
        assert!(payload["error"].as_str().unwrap().contains("boom"));

        let errors = log.at_level(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].trace_id, trace_id);
    }
}
