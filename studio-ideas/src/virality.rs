//! `analyze_virality`: scores a single idea.

use serde::Deserialize;
use serde_json::{Map, Value};
use studio_kernel::{StudioContext, render_prompt};
use studio_primitives::Platform;
use studio_prompts::{PromptVars, library, profile};
use studio_tools::{
    ArgumentSchema, CallContext, ExtractionPolicy, FieldSpec, ToolDescriptor, ToolResult,
    from_args,
};

/// Tool name.
pub const NAME: &str = "analyze_virality";

#[derive(Debug, Deserialize)]
struct ViralityArgs {
    idea: String,
    platform: Platform,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Score the viral potential of a video idea and suggest improvements",
        ArgumentSchema::new()
            .field("idea", FieldSpec::string("The idea or title to assess").required())
            .field(
                "platform",
                FieldSpec::string("Target platform")
                    .one_of(&Platform::names(&Platform::PUBLISHING))
                    .default("youtube"),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing `GEMINI_API_KEY` or when the provider call fails.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: ViralityArgs = from_args(args)?;
    let model = studio.text_model()?;

    let vars = PromptVars::new()
        .with("idea", &args.idea)
        .with("platform", args.platform.display_name())
        .with("platform_notes", profile(args.platform).prompt_summary());
    let prompt = render_prompt(&library::virality_analysis(), &vars)?;

    let text = model.complete(&ctx, library::IDEAS_SYSTEM, prompt).await?;
    match ExtractionPolicy::LENIENT_OBJECT.apply(&ctx, &text)? {
        object @ Value::Object(_) => Ok(object),
        _ => {
            ctx.warn("expected an analysis object, returning empty analysis");
            Ok(Value::Object(Map::new()))
        }
    }
}
