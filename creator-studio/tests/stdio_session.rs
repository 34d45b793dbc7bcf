use std::num::NonZeroUsize;
use std::sync::Arc;

use creator_studio::config::{StaticCredentials, StudioConfig};
use creator_studio::growth;
use creator_studio::kernel::{LiveProviders, SchedulerConfig, StdioServer, StudioContext};
use creator_studio::telemetry::RecordingCallLog;
use creator_studio::tools::Dispatcher;
use serde_json::Value;
use tokio::io::AsyncReadExt;

async fn session(input: &str) -> Vec<Value> {
    let studio = StudioContext::new(
        StudioConfig::default(),
        Arc::new(StaticCredentials::new()),
        Arc::new(LiveProviders),
    );
    let dispatcher = Dispatcher::new(
        growth::registry(&studio).unwrap(),
        Arc::new(RecordingCallLog::new()),
    );
    let server = StdioServer::new(
        dispatcher,
        growth::SERVER_INFO,
        SchedulerConfig::new(NonZeroUsize::new(2).unwrap()),
    );

    let (mut client, server_side) = tokio::io::duplex(256 * 1024);
    server.serve(input.as_bytes(), server_side).await.unwrap();

    let mut out = String::new();
    client.read_to_string(&mut out).await.unwrap();
    let mut responses: Vec<Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    responses.sort_by_key(|response| response["id"].as_i64().unwrap_or(-1));
    responses
}

#[tokio::test]
async fn full_session_over_stdio() {
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"optimize_posting_schedule","arguments":{"historical_data":[{"hour":9,"views":100,"engagement":50},{"hour":9,"views":300,"engagement":70},{"hour":14,"views":50,"engagement":90}]}}}"#,
        r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"optimize_seo","arguments":{"title":"x"}}}"#,
        r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#,
    ]
    .join("\n");

    let responses = session(&input).await;
    assert_eq!(responses.len(), 5);

    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "studio-growth");

    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 5);
    assert_eq!(tools[2]["name"], "optimize_posting_schedule");
    assert!(tools[2]["inputSchema"]["properties"]["historical_data"].is_object());

    let text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
    let schedule: Value = serde_json::from_str(text).unwrap();
    assert_eq!(schedule["recommended_times"][0], "14:00");

    assert_eq!(responses[3]["result"]["isError"], true);
    let text = responses[3]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("GEMINI_API_KEY"));

    assert_eq!(responses[4]["result"], serde_json::json!({}));
}

#[tokio::test]
async fn discovery_is_byte_identical_across_calls() {
    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
    ]
    .join("\n");
    let responses = session(&input).await;
    assert_eq!(
        serde_json::to_string(&responses[0]["result"]).unwrap(),
        serde_json::to_string(&responses[1]["result"]).unwrap()
    );
}
