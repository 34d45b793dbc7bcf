//! `export_project`: editor timelines for Final Cut Pro, Premiere and EDL tools.
//!
//! Pure templating. Documents are not validated against the consuming
//! applications; text values are XML-escaped and nothing else is rewritten.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use studio_kernel::StudioContext;
use studio_tools::{ArgumentSchema, CallContext, FieldSpec, ToolDescriptor, ToolResult, from_args};

/// Tool name.
pub const NAME: &str = "export_project";

/// Project name used when the caller gives none.
pub const DEFAULT_PROJECT_NAME: &str = "Creator Studio Project";

/// Supported timeline formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Final Cut Pro XML 1.9.
    Fcpxml,
    /// Premiere Pro `xmeml` version 4.
    Premiere,
    /// CMX3600-style edit decision list.
    Edl,
}

impl ExportFormat {
    /// Wire names, in declaration order.
    pub const NAMES: [&'static str; 3] = ["fcpxml", "premiere", "edl"];

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Fcpxml => "fcpxml",
            Self::Premiere => "xml",
            Self::Edl => "edl",
        }
    }
}

/// One timeline segment.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SceneSpan {
    /// Clip name.
    pub title: String,
    /// Length in seconds.
    pub duration_seconds: f64,
}

/// Everything needed to render a timeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    name: String,
    fps: u32,
    audio_path: Option<String>,
    clips: Vec<Clip>,
}

#[derive(Clone, Debug, PartialEq)]
struct Clip {
    title: String,
    start: u64,
    frames: u64,
}

impl Timeline {
    /// Lays scenes end to end. With no scenes, one clip spans `duration_seconds`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        duration_seconds: f64,
        fps: u32,
        audio_path: Option<String>,
        scenes: &[SceneSpan],
    ) -> Self {
        let name = name.into();
        let fps = fps.max(1);
        let spans: Vec<(&str, f64)> = if scenes.is_empty() {
            vec![(name.as_str(), duration_seconds)]
        } else {
            scenes
                .iter()
                .map(|scene| (scene.title.as_str(), scene.duration_seconds))
                .collect()
        };

        let mut start = 0;
        let clips = spans
            .into_iter()
            .map(|(title, seconds)| {
                let frames = seconds_to_frames(seconds, fps);
                let clip = Clip {
                    title: title.to_owned(),
                    start,
                    frames,
                };
                start += frames;
                clip
            })
            .collect();

        Self {
            name,
            fps,
            audio_path,
            clips,
        }
    }

    /// Total length in frames.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.clips.iter().map(|clip| clip.frames).sum()
    }

    /// Renders the timeline in the requested format.
    #[must_use]
    pub fn render(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Fcpxml => self.to_fcpxml(),
            ExportFormat::Premiere => self.to_xmeml(),
            ExportFormat::Edl => self.to_edl(),
        }
    }

    fn to_fcpxml(&self) -> String {
        let fps = self.fps;
        let total = self.total_frames();
        let name = xml_escape(&self.name);

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE fcpxml>\n");
        out.push_str("<fcpxml version=\"1.9\">\n  <resources>\n");
        let _ = writeln!(
            out,
            "    <format id=\"r1\" name=\"FFVideoFormat1080p{fps}\" frameDuration=\"1/{fps}s\" width=\"1920\" height=\"1080\"/>"
        );
        if let Some(audio) = &self.audio_path {
            let _ = writeln!(
                out,
                "    <asset id=\"r2\" name=\"voiceover\" src=\"file://{}\" start=\"0s\" duration=\"{total}/{fps}s\" hasAudio=\"1\"/>",
                xml_escape(audio)
            );
        }
        out.push_str("  </resources>\n  <library>\n");
        let _ = writeln!(out, "    <event name=\"{name}\">");
        let _ = writeln!(out, "      <project name=\"{name}\">");
        let _ = writeln!(
            out,
            "        <sequence format=\"r1\" duration=\"{total}/{fps}s\" tcStart=\"0s\" tcFormat=\"NDF\">"
        );
        out.push_str("          <spine>\n");
        for (idx, clip) in self.clips.iter().enumerate() {
            let _ = write!(
                out,
                "            <gap name=\"{}\" offset=\"{}/{fps}s\" duration=\"{}/{fps}s\" start=\"0s\"",
                xml_escape(&clip.title),
                clip.start,
                clip.frames
            );
            if idx == 0 && self.audio_path.is_some() {
                let _ = writeln!(
                    out,
                    ">\n              <asset-clip ref=\"r2\" lane=\"-1\" name=\"voiceover\" offset=\"0s\" duration=\"{total}/{fps}s\"/>\n            </gap>"
                );
            } else {
                out.push_str("/>\n");
            }
        }
        out.push_str("          </spine>\n        </sequence>\n      </project>\n    </event>\n  </library>\n</fcpxml>\n");
        out
    }

    fn to_xmeml(&self) -> String {
        let fps = self.fps;
        let total = self.total_frames();
        let rate = format!("<rate><timebase>{fps}</timebase><ntsc>FALSE</ntsc></rate>");

        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE xmeml>\n");
        out.push_str("<xmeml version=\"4\">\n  <sequence>\n");
        let _ = writeln!(out, "    <name>{}</name>", xml_escape(&self.name));
        let _ = writeln!(out, "    <duration>{total}</duration>");
        let _ = writeln!(out, "    {rate}");
        out.push_str("    <media>\n      <video>\n        <track>\n");
        for (idx, clip) in self.clips.iter().enumerate() {
            let _ = writeln!(
                out,
                "          <clipitem id=\"clip-{}\"><name>{}</name><duration>{}</duration>{rate}<start>{}</start><end>{}</end><in>0</in><out>{}</out></clipitem>",
                idx + 1,
                xml_escape(&clip.title),
                clip.frames,
                clip.start,
                clip.start + clip.frames,
                clip.frames
            );
        }
        out.push_str("        </track>\n      </video>\n      <audio>\n        <track>\n");
        if let Some(audio) = &self.audio_path {
            let _ = writeln!(
                out,
                "          <clipitem id=\"audio-1\"><name>voiceover</name><duration>{total}</duration>{rate}<start>0</start><end>{total}</end><in>0</in><out>{total}</out><file id=\"file-1\"><name>{}</name><pathurl>file://{}</pathurl></file></clipitem>",
                xml_escape(file_name(audio)),
                xml_escape(audio)
            );
        }
        out.push_str("        </track>\n      </audio>\n    </media>\n  </sequence>\n</xmeml>\n");
        out
    }

    fn to_edl(&self) -> String {
        let record_offset = u64::from(self.fps) * 3600;
        let mut out = String::new();
        let _ = writeln!(out, "TITLE: {}", edl_text(&self.name));
        out.push_str("FCM: NON-DROP FRAME\n\n");
        for (idx, clip) in self.clips.iter().enumerate() {
            let end = clip.start + clip.frames;
            let _ = writeln!(
                out,
                "{:03}  AX       V     C        {} {} {} {}",
                idx + 1,
                timecode(clip.start, self.fps),
                timecode(end, self.fps),
                timecode(record_offset + clip.start, self.fps),
                timecode(record_offset + end, self.fps),
            );
            let _ = writeln!(out, "* FROM CLIP NAME: {}\n", edl_text(&clip.title));
        }
        out
    }
}

/// Formats a frame count as `HH:MM:SS:FF`.
#[must_use]
pub fn timecode(frames: u64, fps: u32) -> String {
    let fps = u64::from(fps.max(1));
    let total_seconds = frames / fps;
    format!(
        "{:02}:{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds / 60) % 60,
        total_seconds % 60,
        frames % fps
    )
}

/// Flattens text onto one EDL line by replacing control characters with spaces.
#[must_use]
fn edl_text(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

/// Escapes the five XML special characters.
#[must_use]
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_frames(seconds: f64, fps: u32) -> u64 {
    let frames = (seconds.max(0.0) * f64::from(fps)).round() as u64;
    frames.max(1)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[derive(Debug, Deserialize)]
struct ExportArgs {
    format: ExportFormat,
    project_name: String,
    duration_seconds: f64,
    fps: u32,
    audio_path: Option<String>,
    #[serde(default)]
    scenes: Vec<SceneSpan>,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Export a project timeline as Final Cut Pro XML, Premiere XML or an EDL",
        ArgumentSchema::new()
            .field(
                "format",
                FieldSpec::string("Timeline format")
                    .one_of(&ExportFormat::NAMES)
                    .required(),
            )
            .field(
                "project_name",
                FieldSpec::string("Project and sequence name").default(DEFAULT_PROJECT_NAME),
            )
            .field(
                "duration_seconds",
                FieldSpec::number("Length used when no scenes are given")
                    .range(1.0, 14_400.0)
                    .default(60),
            )
            .field(
                "fps",
                FieldSpec::integer("Frame rate, e.g. 24, 25, 30 or 60")
                    .range(1.0, 120.0)
                    .default(30),
            )
            .field("audio_path", FieldSpec::string("Audio file placed on the timeline"))
            .field(
                "scenes",
                FieldSpec::array(
                    "Clips laid end to end",
                    FieldSpec::object_with(
                        "Scene",
                        ArgumentSchema::new()
                            .field("title", FieldSpec::string("Clip name").required())
                            .field(
                                "duration_seconds",
                                FieldSpec::number("Clip length")
                                    .range(0.01, 14_400.0)
                                    .required(),
                            ),
                    ),
                ),
            ),
    )
}

/// Runs the tool.
///
/// # Errors
///
/// Fails only when the project file cannot be written.
pub async fn run(studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: ExportArgs = from_args(args)?;
    let timeline = Timeline::new(
        args.project_name,
        args.duration_seconds,
        args.fps,
        args.audio_path,
        &args.scenes,
    );
    let document = timeline.render(args.format);
    ctx.debug(&format!(
        "rendered {} clips over {} frames",
        timeline.clips.len(),
        timeline.total_frames()
    ));

    let file_name = format!("project-{}.{}", ctx.trace_id(), args.format.extension());
    let path = studio
        .write_artifact(&ctx, &file_name, document.as_bytes())
        .await?;

    Ok(json!({
        "path": path.display().to_string(),
        "format": args.format,
        "bytes": document.len(),
    }))
}
