//! Newline-delimited JSON-RPC server over stdin/stdout.
//!
//! stdout carries protocol messages only; logs go through `tracing` to stderr.

use std::sync::Arc;

use serde_json::{Value, json};
use studio_tools::Dispatcher;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, RpcRequest,
    RpcResponse,
};
use crate::scheduler::{SchedulerConfig, SchedulerError, TaskScheduler};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reading or writing the transport failed.
    #[error("stdio transport failed: {0}")]
    Io(#[from] std::io::Error),

    /// The scheduler refused work.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Name and version reported by `initialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server name.
    pub name: &'static str,
    /// Server version.
    pub version: &'static str,
}

/// Serves one [`Dispatcher`] over a line-oriented transport.
#[derive(Debug)]
pub struct StdioServer {
    dispatcher: Arc<Dispatcher>,
    info: ServerInfo,
    scheduler: TaskScheduler,
}

impl StdioServer {
    /// Creates a server.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, info: ServerInfo, scheduler: SchedulerConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            info,
            scheduler: TaskScheduler::new(scheduler),
        }
    }

    /// Serves stdin/stdout until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] when the transport fails.
    pub async fn serve_stdio(self) -> ServerResult<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serves the supplied transport until the reader reaches EOF.
    ///
    /// Requests run concurrently on the scheduler; replies funnel through a
    /// single writer task so lines never interleave. At EOF in-flight calls are
    /// drained before returning.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] when reading or writing fails.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> ServerResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!(server = self.info.name, version = self.info.version, "server started");

        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_lines(writer, rx));

        let mut lines = reader.lines();
        let read_result = loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        self.handle_line(line, &tx)?;
                    }
                }
                Ok(None) => break Ok(()),
                Err(err) => break Err(ServerError::Io(err)),
            }
        };

        self.scheduler.drain().await;
        drop(tx);
        let write_result = match writer_task.await {
            Ok(result) => result.map_err(ServerError::Io),
            Err(err) => Err(ServerError::Io(std::io::Error::other(err))),
        };

        info!(server = self.info.name, "server stopped");
        read_result.and(write_result)
    }

    fn handle_line(&self, line: &str, tx: &mpsc::UnboundedSender<String>) -> ServerResult<()> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "unparsable request");
                send(
                    tx,
                    &RpcResponse::failure(Value::Null, PARSE_ERROR, format!("parse error: {err}")),
                );
                return Ok(());
            }
        };

        let id_hint = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: RpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(err) => {
                send(
                    tx,
                    &RpcResponse::failure(id_hint, INVALID_REQUEST, format!("invalid request: {err}")),
                );
                return Ok(());
            }
        };

        debug!(method = %request.method, "request received");
        let Some(id) = request.id else {
            if request.method != "notifications/initialized" {
                debug!(method = %request.method, "ignoring notification");
            }
            return Ok(());
        };

        match request.method.as_str() {
            "initialize" => send(tx, &RpcResponse::success(id, self.initialize_result())),
            "ping" => send(tx, &RpcResponse::success(id, json!({}))),
            "tools/list" => {
                let tools = self.dispatcher.registry().list();
                send(tx, &RpcResponse::success(id, json!({ "tools": tools })));
            }
            "tools/call" => self.spawn_call(id, request.params, tx)?,
            other => send(
                tx,
                &RpcResponse::failure(id, METHOD_NOT_FOUND, format!("method not found: {other}")),
            ),
        }
        Ok(())
    }

    fn spawn_call(
        &self,
        id: Value,
        params: Value,
        tx: &mpsc::UnboundedSender<String>,
    ) -> ServerResult<()> {
        let Some(name) = params.get("name").and_then(Value::as_str).map(str::to_owned) else {
            send(
                tx,
                &RpcResponse::failure(id, INVALID_PARAMS, "tools/call requires a string `name`"),
            );
            return Ok(());
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let dispatcher = Arc::clone(&self.dispatcher);
        let tx = tx.clone();
        self.scheduler.spawn(async move {
            let envelope = dispatcher.dispatch(&name, arguments).await;
            let result = serde_json::to_value(&envelope).unwrap_or(Value::Null);
            send(&tx, &RpcResponse::success(id, result));
        })?;
        Ok(())
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": self.info.name, "version": self.info.version },
        })
    }
}

fn send(tx: &mpsc::UnboundedSender<String>, response: &RpcResponse) {
    if tx.send(response.to_line()).is_err() {
        warn!("writer closed, dropping response");
    }
}

async fn write_lines<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use studio_telemetry::RecordingCallLog;
    use studio_tools::{ArgumentSchema, CallContext, FieldSpec, ToolDescriptor, ToolRegistry};
    use tokio::io::AsyncReadExt;

    use super::*;

    fn server() -> StdioServer {
        let mut registry = ToolRegistry::new();
        registry
            .register_tool(
                ToolDescriptor::new(
                    "echo",
                    "Echoes the message",
                    ArgumentSchema::new().field("message", FieldSpec::string("").required()),
                )
                .unwrap(),
                |_ctx: CallContext, args: Value| async move { Ok(args) },
            )
            .unwrap();
        StdioServer::new(
            Dispatcher::new(registry, Arc::new(RecordingCallLog::new())),
            ServerInfo {
                name: "test-server",
                version: "0.0.0",
            },
            SchedulerConfig::new(NonZeroUsize::new(4).unwrap()),
        )
    }

    async fn run(input: &str) -> Vec<Value> {
        let (mut client, server_side) = tokio::io::duplex(64 * 1024);

        server()
            .serve(input.as_bytes(), server_side)
            .await
            .unwrap();

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        let mut responses: Vec<Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        responses.sort_by_key(|r| r["id"].as_i64().unwrap_or(-1));
        responses
    }

    #[tokio::test]
    async fn handshake_list_and_call() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"echo","arguments":{"message":"hi"}}}"#,
            "\n",
        );
        let responses = run(input).await;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(responses[1]["result"]["tools"][0]["name"], "echo");
        let text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap()["message"], "hi");
        assert!(responses[2]["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn protocol_errors() {
        let input = concat!(
            "not json\n",
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{}}"#,
            "\n",
        );
        let responses = run(input).await;
        assert_eq!(responses[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(responses[1]["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(responses[2]["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn tool_failures_are_envelopes_not_rpc_errors() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"nope"}}"#,
            "\n",
        );
        let responses = run(input).await;
        assert!(responses[0].get("error").is_none());
        assert_eq!(responses[0]["result"]["isError"], true);
    }
}
