//! Runtime shared by the creator tool servers.
//!
//! [`StudioContext`] carries configuration and the external capabilities
//! (text model, speech, trends, artifact output) behind swappable ports.
//! [`StdioServer`] exposes a [`studio_tools::Dispatcher`] over newline-delimited
//! JSON-RPC, running calls concurrently on a bounded [`TaskScheduler`].

#![warn(missing_docs, clippy::pedantic)]

mod context;
pub mod protocol;
mod scheduler;
mod server;

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use studio_config::StudioConfig;
use studio_prompts::{PromptTemplate, PromptVars};
use studio_telemetry::TracingCallLog;
use studio_tools::{CallContext, Dispatcher, Tool, ToolError, ToolRegistry, ToolResult};

pub use context::{LiveProviders, ProviderFactory, StudioContext, TextModel, speech_credential};
pub use scheduler::{SchedulerConfig, SchedulerError, SchedulerResult, TaskScheduler};
pub use server::{ServerError, ServerInfo, ServerResult, StdioServer};

/// Serves `registry` on stdin/stdout with production logging and the
/// configured concurrency limit.
///
/// # Errors
///
/// Returns [`ServerError`] when the stdio transport fails.
pub async fn serve_stdio(
    info: ServerInfo,
    config: &StudioConfig,
    registry: ToolRegistry,
) -> ServerResult<()> {
    let dispatcher = Dispatcher::new(registry, Arc::new(TracingCallLog::new(info.name)));
    StdioServer::new(
        dispatcher,
        info,
        SchedulerConfig::new(config.max_concurrency()),
    )
    .serve_stdio()
    .await
}

/// Binds a handler to the shared context so it can be registered as a [`Tool`].
pub fn bind<F, Fut>(studio: &StudioContext, handler: F) -> impl Tool + 'static
where
    F: Fn(StudioContext, CallContext, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolResult<Value>> + Send + 'static,
{
    let studio = studio.clone();
    move |ctx: CallContext, args: Value| handler(studio.clone(), ctx, args)
}

/// Renders a prompt, mapping template errors into the tool taxonomy.
///
/// # Errors
///
/// Returns [`ToolError::Execution`] when a required variable is missing.
pub fn render_prompt(template: &PromptTemplate, vars: &PromptVars) -> ToolResult<String> {
    template
        .render(vars)
        .map_err(|err| ToolError::execution(format!("prompt rendering failed: {err}")))
}
