//! Trace-correlated logging port.

use std::fmt;
use std::sync::Mutex;

use studio_primitives::TraceId;
use tracing::{debug, error, info, warn};

/// Severity of a log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal progress.
    Info,
    /// Recovered problems, such as dropped elements or skipped sources.
    Warn,
    /// Failures surfaced to the caller.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Leveled logging keyed by the trace id of the call that emits it.
pub trait CallLog: Send + Sync {
    /// Emits one log line.
    fn log(&self, level: LogLevel, trace_id: TraceId, message: &str);

    /// Emits a debug line.
    fn debug(&self, trace_id: TraceId, message: &str) {
        self.log(LogLevel::Debug, trace_id, message);
    }

    /// Emits an info line.
    fn info(&self, trace_id: TraceId, message: &str) {
        self.log(LogLevel::Info, trace_id, message);
    }

    /// Emits a warning line.
    fn warn(&self, trace_id: TraceId, message: &str) {
        self.log(LogLevel::Warn, trace_id, message);
    }

    /// Emits an error line.
    fn error(&self, trace_id: TraceId, message: &str) {
        self.log(LogLevel::Error, trace_id, message);
    }
}

/// Forwards log lines to the installed `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingCallLog {
    component: &'static str,
}

impl TracingCallLog {
    /// Creates a port tagging every line with the supplied component name.
    #[must_use]
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl CallLog for TracingCallLog {
    fn log(&self, level: LogLevel, trace_id: TraceId, message: &str) {
        let component = self.component;
        match level {
            LogLevel::Debug => debug!(%trace_id, component, "{message}"),
            LogLevel::Info => info!(%trace_id, component, "{message}"),
            LogLevel::Warn => warn!(%trace_id, component, "{message}"),
            LogLevel::Error => error!(%trace_id, component, "{message}"),
        }
    }
}

/// A captured log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    /// Severity.
    pub level: LogLevel,
    /// Correlation id.
    pub trace_id: TraceId,
    /// Rendered message.
    pub message: String,
}

/// Keeps every line in memory; used by tests and embedders that inspect output.
#[derive(Debug, Default)]
pub struct RecordingCallLog {
    lines: Mutex<Vec<LogLine>>,
}

impl RecordingCallLog {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the captured lines.
    #[must_use]
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Returns the captured lines at the supplied level.
    #[must_use]
    pub fn at_level(&self, level: LogLevel) -> Vec<LogLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.level == level)
            .collect()
    }
}

impl CallLog for RecordingCallLog {
    fn log(&self, level: LogLevel, trace_id: TraceId, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(LogLine {
                level,
                trace_id,
                message: message.to_owned(),
            });
        }
    }
}
