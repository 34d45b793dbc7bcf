//! `repurpose_content`: adapts one piece for other platforms.

use serde::Deserialize;
use serde_json::Value;
use studio_kernel::{StudioContext, render_prompt};
use studio_primitives::Platform;
use studio_prompts::{PromptVars, library, profile};
use studio_tools::{
    ArgumentSchema, CallContext, ExtractionPolicy, FieldSpec, ToolDescriptor, ToolResult,
    from_args,
};

use crate::object_or_empty;

/// Tool name.
pub const NAME: &str = "repurpose_content";

#[derive(Debug, Deserialize)]
struct RepurposeArgs {
    content: String,
    source_platform: Platform,
    target_platforms: Vec<Platform>,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    let platforms = Platform::names(&Platform::PUBLISHING);
    ToolDescriptor::new(
        NAME,
        "Adapt existing content for other platforms, keyed by platform",
        ArgumentSchema::new()
            .field("content", FieldSpec::string("Original content").required())
            .field(
                "source_platform",
                FieldSpec::string("Where the content was published")
                    .one_of(&platforms)
                    .required(),
            )
            .field(
                "target_platforms",
                FieldSpec::array(
                    "Platforms to adapt for",
                    FieldSpec::string("Platform").one_of(&platforms),
                )
                .min_items(1)
                .required(),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing `GEMINI_API_KEY` or when the provider call fails.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: RepurposeArgs = from_args(args)?;
    let model = studio.text_model()?;

    let notes = args
        .target_platforms
        .iter()
        .map(|platform| profile(*platform).prompt_summary())
        .collect::<Vec<_>>()
        .join("\n\n");
    let vars = PromptVars::new()
        .with("source_platform", args.source_platform.display_name())
        .with("content", &args.content)
        .with(
            "target_platforms",
            Platform::names(&args.target_platforms).join(", "),
        )
        .with("platform_notes", notes);
    let prompt = render_prompt(&library::repurpose(), &vars)?;

    let text = model.complete(&ctx, library::GROWTH_SYSTEM, prompt).await?;
    let value = ExtractionPolicy::LENIENT_OBJECT.apply(&ctx, &text)?;
    Ok(object_or_empty(&ctx, value))
}
