//! Per-call context handed to every tool.

use std::fmt;
use std::sync::Arc;

use studio_primitives::TraceId;
use studio_telemetry::{CallLog, LogLevel};

/// Trace id, tool name and logging port for one inbound call.
///
/// Cheap to clone; dropped when the call completes.
#[derive(Clone)]
pub struct CallContext {
    trace_id: TraceId,
    tool: Arc<str>,
    log: Arc<dyn CallLog>,
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("trace_id", &self.trace_id)
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

impl CallContext {
    /// Creates a context for the named tool.
    #[must_use]
    pub fn new(trace_id: TraceId, tool: &str, log: Arc<dyn CallLog>) -> Self {
        Self {
            trace_id,
            tool: Arc::from(tool),
            log,
        }
    }

    /// Correlation id of the call.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Name of the tool being invoked.
    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Logging port shared by the server.
    #[must_use]
    pub fn log(&self) -> &Arc<dyn CallLog> {
        &self.log
    }

    fn emit(&self, level: LogLevel, message: &str) {
        self.log
            .log(level, self.trace_id, &format!("[{}] {message}", self.tool));
    }

    /// Logs at debug level.
    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message);
    }

    /// Logs at info level.
    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    /// Logs at warn level.
    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    /// Logs at error level.
    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message);
    }
}
