//! `generate_video_ideas`: trend-aware idea generation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use studio_kernel::{StudioContext, render_prompt};
use studio_primitives::Platform;
use studio_prompts::{PromptVars, library, profile};
use studio_tools::{
    ArgumentSchema, CallContext, ElementCheck, ExtractionPolicy, FieldSpec, ToolDescriptor,
    ToolResult, from_args, retain_valid,
};

/// Tool name.
pub const NAME: &str = "generate_video_ideas";

/// Trending topics quoted in the prompt at most.
const MAX_PROMPT_TRENDS: usize = 10;

/// One generated idea.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoIdea {
    /// Working title.
    pub title: String,
    /// Opening line.
    pub hook: String,
    /// Short pitch.
    #[serde(default)]
    pub description: String,
    /// Video format, e.g. tutorial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Target platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Predicted virality, 0-100.
    pub viral_score: f64,
}

impl ElementCheck for VideoIdea {
    fn check(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("empty title".into());
        }
        if self.hook.trim().is_empty() {
            return Err("empty hook".into());
        }
        if !(0.0..=100.0).contains(&self.viral_score) {
            return Err(format!("viral_score {} outside 0-100", self.viral_score));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct IdeaArgs {
    niche: String,
    platforms: Vec<Platform>,
    count: usize,
    audience: Option<String>,
    include_trends: bool,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Generate viral video ideas for a niche, optionally informed by current trends",
        ArgumentSchema::new()
            .field(
                "niche",
                FieldSpec::string("Content niche, e.g. \"home espresso\"").required(),
            )
            .field(
                "platforms",
                FieldSpec::array(
                    "Platforms the ideas target",
                    FieldSpec::string("Platform").one_of(&Platform::names(&Platform::PUBLISHING)),
                )
                .items_between(1, 5)
                .default(json!(["youtube"])),
            )
            .field(
                "count",
                FieldSpec::integer("Number of ideas").range(1.0, 20.0).default(5),
            )
            .field("audience", FieldSpec::string("Target audience description"))
            .field(
                "include_trends",
                FieldSpec::boolean("Fetch trending topics first").default(true),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing `GEMINI_API_KEY` or when the provider call fails.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: IdeaArgs = from_args(args)?;
    let model = studio.text_model()?;

    let mut trends = if args.include_trends {
        studio
            .trending_topics(&ctx, &args.niche, &args.platforms)
            .await
    } else {
        Vec::new()
    };
    trends.truncate(MAX_PROMPT_TRENDS);

    let platform_notes = args
        .platforms
        .iter()
        .map(|platform| profile(*platform).prompt_summary())
        .collect::<Vec<_>>()
        .join("\n\n");
    let vars = PromptVars::new()
        .with("count", args.count)
        .with("niche", &args.niche)
        .with("platforms", Platform::names(&args.platforms).join(", "))
        .with(
            "audience",
            args.audience.as_deref().unwrap_or("general audience"),
        )
        .with("trends", trends.join(", "))
        .with("platform_notes", platform_notes);
    let prompt = render_prompt(&library::video_ideas(), &vars)?;

    let text = model.complete(&ctx, library::IDEAS_SYSTEM, prompt).await?;
    let value = ExtractionPolicy::LENIENT_ARRAY.apply(&ctx, &text)?;
    let mut ideas: Vec<VideoIdea> = retain_valid(&ctx, "ideas", unwrap_ideas(value));
    ideas.truncate(args.count);

    Ok(json!({
        "count": ideas.len(),
        "ideas": ideas,
        "trends_used": trends,
    }))
}

/// Accepts either a bare array or `{"ideas": [...]}`.
fn unwrap_ideas(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("ideas").is_some_and(Value::is_array) => {
            map.remove("ideas").unwrap_or_default()
        }
        other => other,
    }
}
