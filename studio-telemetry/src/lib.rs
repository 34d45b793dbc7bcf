//! Observability utilities for the tool servers.
//!
//! [`call_log`] defines the logging port handed to every tool call, and
//! [`tracing_support`] installs the process-wide `tracing` subscriber that the
//! production port forwards to.

#![warn(missing_docs, clippy::pedantic)]

pub mod call_log;
pub mod tracing_support;

pub use call_log::{CallLog, LogLevel, LogLine, RecordingCallLog, TracingCallLog};
pub use tracing_support::{TelemetryError, TelemetryResult, init_subscriber};
