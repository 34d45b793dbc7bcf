//! `generate_script`: full narrated script with timed sections.

use serde::Deserialize;
use serde_json::Value;
use studio_kernel::{StudioContext, render_prompt};
use studio_primitives::Platform;
use studio_prompts::{PromptVars, library, profile};
use studio_tools::{
    ArgumentSchema, CallContext, ExtractionPolicy, FieldSpec, ToolDescriptor, ToolError,
    ToolResult, from_args,
};

/// Tool name.
pub const NAME: &str = "generate_script";

/// Accepted tones.
pub const TONES: [&str; 5] = [
    "educational",
    "entertaining",
    "inspirational",
    "professional",
    "casual",
];

#[derive(Debug, Deserialize)]
struct ScriptArgs {
    topic: String,
    platform: Platform,
    duration_seconds: u32,
    tone: String,
    include_cta: bool,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Write a complete video script with hook, timed sections and call to action",
        ArgumentSchema::new()
            .field("topic", FieldSpec::string("What the video is about").required())
            .field(
                "platform",
                FieldSpec::string("Target platform")
                    .one_of(&Platform::names(&Platform::PUBLISHING))
                    .default("youtube"),
            )
            .field(
                "duration_seconds",
                FieldSpec::integer("Target length in seconds")
                    .range(15.0, 3600.0)
                    .default(60),
            )
            .field(
                "tone",
                FieldSpec::string("Delivery tone")
                    .one_of(&TONES)
                    .default("entertaining"),
            )
            .field(
                "include_cta",
                FieldSpec::boolean("End with a call to action").default(true),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing `GEMINI_API_KEY`, a provider failure, or a reply that
/// does not contain a script object with a `sections` array.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: ScriptArgs = from_args(args)?;
    let model = studio.text_model()?;

    let cta_instruction = if args.include_cta {
        "Close with a clear call to action suited to the platform."
    } else {
        "Do not include a call to action; leave call_to_action empty."
    };
    let vars = PromptVars::new()
        .with("duration", args.duration_seconds)
        .with("tone", &args.tone)
        .with("topic", &args.topic)
        .with("platform", args.platform.display_name())
        .with("cta_instruction", cta_instruction)
        .with("platform_notes", profile(args.platform).prompt_summary());
    let prompt = render_prompt(&library::script(), &vars)?;

    let text = model.complete(&ctx, library::SCRIPTS_SYSTEM, prompt).await?;
    let script = ExtractionPolicy::Strict.apply(&ctx, &text)?;
    ensure_sections(&script)?;
    Ok(script)
}

fn ensure_sections(script: &Value) -> ToolResult<()> {
    match script.get("sections") {
        Some(Value::Array(sections)) => {
            if sections.is_empty() {
                return Err(ToolError::extraction("script has an empty `sections` array"));
            }
            Ok(())
        }
        Some(_) => Err(ToolError::extraction("script `sections` is not an array")),
        None => Err(ToolError::extraction("script has no `sections` array")),
    }
}
