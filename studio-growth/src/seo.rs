//! `optimize_seo`: titles, description, tags and hashtags.

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
pub const NAME: &str = "optimize_seo";

#[derive(Debug, Deserialize)]
struct SeoArgs {
    title: String,
    description: String,
    platform: Platform,
    keywords: Vec<String>,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Optimize a title, description, tags and hashtags for platform search",
        ArgumentSchema::new()
            .field("title", FieldSpec::string("Current title").required())
            .field("description", FieldSpec::string("Current description").default(""))
            .field(
                "platform",
                FieldSpec::string("Target platform")
                    .one_of(&Platform::names(&Platform::PUBLISHING))
                    .default("youtube"),
            )
            .field(
                "keywords",
                FieldSpec::array("Seed keywords", FieldSpec::string("Keyword"))
                    .default(Value::Array(Vec::new())),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing `GEMINI_API_KEY` or when the provider call fails.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: SeoArgs = from_args(args)?;
    let model = studio.text_model()?;

    let profile = profile(args.platform);
    let keywords = if args.keywords.is_empty() {
        "none given".to_owned()
    } else {
        args.keywords.join(", ")
    };
    let vars = PromptVars::new()
        .with("platform", args.platform.display_name())
        .with("title", &args.title)
        .with("description", &args.description)
        .with("keywords", keywords)
        .with("title_limit", profile.max_title_chars)
        .with("hashtag_limit", profile.hashtag_limit);
    let prompt = render_prompt(&library::seo(), &vars)?;

    let text = model.complete(&ctx, library::GROWTH_SYSTEM, prompt).await?;
    let value = ExtractionPolicy::LENIENT_OBJECT.apply(&ctx, &text)?;
    Ok(object_or_empty(&ctx, value))
}
