//! `generate_storyboard`: scene breakdown of an existing script.

use serde::Deserialize;
use serde_json::{Value, json};
use studio_kernel::{StudioContext, render_prompt};
use studio_prompts::{PromptVars, library};
use studio_tools::{
    ArgumentSchema, CallContext, ExtractionPolicy, FieldSpec, ToolDescriptor, ToolError,
    ToolResult, from_args,
};

/// Tool name.
pub const NAME: &str = "generate_storyboard";

/// Accepted visual styles.
pub const STYLES: [&str; 5] = ["cinematic", "minimal", "vlog", "animated", "documentary"];

#[derive(Debug, Deserialize)]
struct StoryboardArgs {
    script: String,
    style: String,
    scene_count: u32,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Break a script into storyboard scenes with shots, narration and on-screen text",
        ArgumentSchema::new()
            .field("script", FieldSpec::string("Script text to storyboard").required())
            .field(
                "style",
                FieldSpec::string("Visual style")
                    .one_of(&STYLES)
                    .default("cinematic"),
            )
            .field(
                "scene_count",
                FieldSpec::integer("Number of scenes").range(1.0, 30.0).default(6),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing `GEMINI_API_KEY`, a provider failure, or a reply that
/// holds no scene list.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: StoryboardArgs = from_args(args)?;
    let model = studio.text_model()?;

    let vars = PromptVars::new()
        .with("scene_count", args.scene_count)
        .with("style", &args.style)
        .with("script", &args.script);
    let prompt = render_prompt(&library::storyboard(), &vars)?;

    let text = model.complete(&ctx, library::SCRIPTS_SYSTEM, prompt).await?;
    let scenes = scenes_of(ExtractionPolicy::Strict.apply(&ctx, &text)?)?;
    if scenes.len() != args.scene_count as usize {
        ctx.info(&format!(
            "asked for {} scenes, received {}",
            args.scene_count,
            scenes.len()
        ));
    }

    Ok(json!({
        "scene_count": scenes.len(),
        "scenes": scenes,
    }))
}

/// Accepts a bare array or an object carrying `scenes`.
fn scenes_of(value: Value) -> ToolResult<Vec<Value>> {
    match value {
        Value::Array(scenes) => Ok(scenes),
        Value::Object(mut map) => match map.remove("scenes") {
            Some(Value::Array(scenes)) => Ok(scenes),
            _ => Err(ToolError::extraction("storyboard object has no `scenes` array")),
        },
        _ => Err(ToolError::extraction("storyboard is neither an array nor an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenes_from_array_or_wrapper() {
        assert_eq!(scenes_of(json!([{"scene_number": 1}])).unwrap().len(), 1);
        assert_eq!(scenes_of(json!({"scenes": [{}, {}]})).unwrap().len(), 2);
        assert!(scenes_of(json!({"shots": []})).is_err());
        assert!(scenes_of(json!("scene one")).is_err());
    }
}
