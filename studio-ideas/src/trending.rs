//! `get_trending_topics`: trend scraper passthrough.

use serde::Deserialize;
use serde_json::{Value, json};
use studio_kernel::StudioContext;
use studio_primitives::Platform;
use studio_tools::{ArgumentSchema, CallContext, FieldSpec, ToolDescriptor, ToolResult, from_args};

/// Tool name.
pub const NAME: &str = "get_trending_topics";

#[derive(Debug, Deserialize)]
struct TrendArgs {
    niche: String,
    platforms: Vec<Platform>,
    limit: usize,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Collect currently trending topics for a niche from public platform sources",
        ArgumentSchema::new()
            .field("niche", FieldSpec::string("Content niche").required())
            .field(
                "platforms",
                FieldSpec::array(
                    "Sources to query, in order",
                    FieldSpec::string("Platform").one_of(&Platform::names(&Platform::ALL)),
                )
                .min_items(1)
                .default(json!(["youtube", "reddit", "google"])),
            )
            .field(
                "limit",
                FieldSpec::integer("Maximum topics returned").range(1.0, 50.0).default(20),
            ),
    )
}

/// Runs the tool. Source failures are logged and never fail the call.
///
/// # Errors
///
/// Only argument deserialization can fail.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: TrendArgs = from_args(args)?;
    let mut topics = studio
        .trending_topics(&ctx, &args.niche, &args.platforms)
        .await;
    topics.truncate(args.limit);

    Ok(json!({
        "niche": args.niche,
        "count": topics.len(),
        "topics": topics,
    }))
}
