//! Prompt text for every generative tool.
//!
//! Every prompt ends with an explicit output contract; the handlers extract the
//! first JSON region from the reply, so the contract only needs to make that
//! region likely, not guaranteed.

use crate::template::PromptTemplate;

/// Persona for the idea-generation adapter.
pub const IDEAS_SYSTEM: &str = "You are a senior content strategist who has grown multiple creator channels past one million followers. You answer with valid JSON only.";

/// Persona for the script-production adapter.
pub const SCRIPTS_SYSTEM: &str = "You are an experienced video scriptwriter and storyboard artist for online creators. You answer with valid JSON only.";

/// Persona for the growth-optimization adapter.
pub const GROWTH_SYSTEM: &str = "You are a growth marketer specialising in platform algorithms, SEO and audience retention. You answer with valid JSON only.";

/// Viral video idea generation.
#[must_use]
pub fn video_ideas() -> PromptTemplate {
    PromptTemplate::new(
        "Generate {{count}} original video ideas in the \"{{niche}}\" niche for {{platforms}}.
Target audience: {{audience}}
Currently trending topics to draw from (may be empty): {{trends}}

Platform guidance:
{{platform_notes}}

Return a JSON array. Each element must be an object with:
\"title\" (string), \"hook\" (the opening line, string), \"description\" (string),
\"format\" (string, e.g. tutorial, reaction, story), \"platform\" (one of the requested platforms),
\"viral_score\" (number from 0 to 100).",
    )
    .require(&["count", "niche", "platforms"])
}

/// Virality analysis for a single idea.
#[must_use]
pub fn virality_analysis() -> PromptTemplate {
    PromptTemplate::new(
        "Assess the viral potential of this video idea on {{platform}}:
\"{{idea}}\"

Platform guidance:
{{platform_notes}}

Return a JSON object with \"score\" (0-100), \"strengths\" (array of strings),
\"weaknesses\" (array of strings), \"improvements\" (array of strings) and
\"target_emotion\" (string).",
    )
    .require(&["idea", "platform"])
}

/// Full video script.
#[must_use]
pub fn script() -> PromptTemplate {
    PromptTemplate::new(
        "Write a {{duration}}-second {{tone}} video script about \"{{topic}}\" for {{platform}}.
{{cta_instruction}}

Platform guidance:
{{platform_notes}}

Return a JSON object with \"title\" (string), \"hook\" (string), \"sections\" (array of
objects with \"heading\", \"narration\", \"visual_notes\" and \"duration_seconds\"),
\"call_to_action\" (string) and \"estimated_duration_seconds\" (number).",
    )
    .require(&["duration", "tone", "topic", "platform"])
}

/// Storyboard derived from a script.
#[must_use]
pub fn storyboard() -> PromptTemplate {
    PromptTemplate::new(
        "Break the following script into exactly {{scene_count}} storyboard scenes in a {{style}} visual style.

Script:
{{script}}

Return a JSON array of scenes. Each scene is an object with \"scene_number\" (integer),
\"title\" (string), \"shot_type\" (string), \"description\" (string), \"narration\" (string),
\"on_screen_text\" (string) and \"duration_seconds\" (number).",
    )
    .require(&["scene_count", "style", "script"])
}

/// Title, description and tag optimization.
#[must_use]
pub fn seo() -> PromptTemplate {
    PromptTemplate::new(
        "Optimize this {{platform}} upload for search and discovery.
Title: {{title}}
Description: {{description}}
Seed keywords: {{keywords}}
Title limit: {{title_limit}} characters. Hashtag limit: {{hashtag_limit}}.

Return a JSON object with \"optimized_title\" (string), \"alternative_titles\" (array of strings),
\"optimized_description\" (string), \"tags\" (array of strings), \"hashtags\" (array of strings)
and \"seo_score\" (0-100).",
    )
    .require(&["platform", "title"])
}

/// Thumbnail concepts.
#[must_use]
pub fn thumbnails() -> PromptTemplate {
    PromptTemplate::new(
        "Design {{count}} distinct thumbnail concepts for the {{platform}} video \"{{title}}\".
Preferred style: {{style}}
Aspect ratio: {{aspect_ratio}}

Return a JSON array. Each element is an object with \"concept\" (string), \"text_overlay\" (string),
\"colors\" (array of strings), \"composition\" (string) and \"emotion\" (string).",
    )
    .require(&["count", "platform", "title"])
}

/// Cross-platform repurposing.
#[must_use]
pub fn repurpose() -> PromptTemplate {
    PromptTemplate::new(
        "The following content was created for {{source_platform}}:
{{content}}

Adapt it for each of these platforms: {{target_platforms}}.

Platform guidance:
{{platform_notes}}

Return a JSON object keyed by platform name. Each value is an object with \"format\" (string),
\"content\" (string), \"hashtags\" (array of strings) and \"notes\" (string).",
    )
    .require(&["source_platform", "content", "target_platforms"])
}

/// A/B test variants.
#[must_use]
pub fn ab_test() -> PromptTemplate {
    PromptTemplate::new(
        "Create {{variant_count}} A/B test variants of this {{platform}} {{content_type}}:
\"{{original}}\"

Return a JSON array. Each element is an object with \"variant\" (string), \"hypothesis\" (string),
\"changed_element\" (string) and \"expected_impact\" (string).",
    )
    .require(&["variant_count", "platform", "content_type", "original"])
}
