//! `generate_voiceover`: text-to-speech into the output directory.

use serde::Deserialize;
use serde_json::{Value, json};
use studio_adapters::speech::{AudioFormat, SpeechProvider, SpeechRequest};
use studio_kernel::StudioContext;
use studio_tools::{
    ArgumentSchema, CallContext, FieldSpec, ToolDescriptor, ToolError, ToolResult, from_args,
};

/// Tool name.
pub const NAME: &str = "generate_voiceover";

#[derive(Debug, Deserialize)]
struct VoiceoverArgs {
    text: String,
    provider: SpeechProvider,
    voice_id: Option<String>,
    speed: f32,
    format: AudioFormat,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Synthesize a voiceover from text and save it as an audio file",
        ArgumentSchema::new()
            .field("text", FieldSpec::string("Narration text").required())
            .field(
                "provider",
                FieldSpec::string("Speech provider")
                    .one_of(&SpeechProvider::NAMES)
                    .default("elevenlabs"),
            )
            .field(
                "voice_id",
                FieldSpec::string("Provider voice; defaults to the provider's standard voice")
                    .identifier(),
            )
            .field(
                "speed",
                FieldSpec::number(
                    "Playback speed multiplier; ElevenLabs clamps it to 0.7-1.2",
                )
                    .range(0.5, 2.0)
                    .default(1.0),
            )
            .field(
                "format",
                FieldSpec::string("Audio container")
                    .one_of(&AudioFormat::NAMES)
                    .default("mp3"),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails on a missing provider credential, a synthesis failure, or when the
/// audio file cannot be written.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: VoiceoverArgs = from_args(args)?;
    let voice = args
        .voice_id
        .unwrap_or_else(|| args.provider.default_voice().to_owned());
    let request = SpeechRequest::new(args.text, voice, args.speed, args.format)
        .map_err(|err| ToolError::violation("text", "required", err.to_string()))?;

    let audio = studio.synthesize(&ctx, args.provider, request).await?;
    let file_name = format!(
        "voiceover-{}.{}",
        ctx.trace_id(),
        args.format.extension()
    );
    let path = studio.write_artifact(&ctx, &file_name, &audio).await?;

    Ok(json!({
        "path": path.display().to_string(),
        "provider": args.provider,
        "bytes": audio.len(),
        "format": args.format,
    }))
}
