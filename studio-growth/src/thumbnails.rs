//! `generate_thumbnail_concepts`.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use studio_kernel::{StudioContext, render_prompt};
use studio_primitives::Platform;
use studio_prompts::{PromptVars, library, profile};
use studio_tools::{
    ArgumentSchema, CallContext, ElementCheck, ExtractionPolicy, FieldSpec, ToolDescriptor,
    ToolResult, from_args, retain_valid,
};

use crate::list_under;

/// Tool name.
pub const NAME: &str = "generate_thumbnail_concepts";

/// One thumbnail design.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailConcept {
    /// What the image shows.
    pub concept: String,
    /// Overlay text.
    #[serde(default)]
    pub text_overlay: String,
    /// Dominant colours.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Layout notes.
    #[serde(default)]
    pub composition: String,
    /// Emotion conveyed.
    #[serde(default)]
    pub emotion: String,
}

impl ElementCheck for ThumbnailConcept {
    fn check(&self) -> Result<(), String> {
        if self.concept.trim().is_empty() {
            return Err("empty concept".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ThumbnailArgs {
    title: String,
    platform: Platform,
    style: Option<String>,
    count: usize,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Design thumbnail concepts with overlay text, colours and composition",
        ArgumentSchema::new()
            .field("title", FieldSpec::string("Video title").required())
            .field(
                "platform",
                FieldSpec::string("Target platform")
                    .one_of(&Platform::names(&Platform::PUBLISHING))
                    .default("youtube"),
            )
            .field("style", FieldSpec::string("Preferred visual style"))
            .field(
                "count",
                FieldSpec::integer("Number of concepts").range(1.0, 10.0).default(3),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing `GEMINI_API_KEY` or when the provider call fails.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: ThumbnailArgs = from_args(args)?;
    let model = studio.text_model()?;

    let vars = PromptVars::new()
        .with("count", args.count)
        .with("platform", args.platform.display_name())
        .with("title", &args.title)
        .with("style", args.style.as_deref().unwrap_or("creator's choice"))
        .with("aspect_ratio", profile(args.platform).aspect_ratio);
    let prompt = render_prompt(&library::thumbnails(), &vars)?;

    let text = model.complete(&ctx, library::GROWTH_SYSTEM, prompt).await?;
    let value = ExtractionPolicy::LENIENT_ARRAY.apply(&ctx, &text)?;
    let mut concepts: Vec<ThumbnailConcept> =
        retain_valid(&ctx, "concepts", list_under(value, "concepts"));
    concepts.truncate(args.count);

    Ok(json!({
        "count": concepts.len(),
        "concepts": concepts,
    }))
}
