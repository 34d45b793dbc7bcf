//! Per-platform constants used when building prompts and static defaults.

use studio_primitives::Platform;

/// Publishing conventions for one platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Platform the profile describes.
    pub platform: Platform,
    /// Maximum title length in characters.
    pub max_title_chars: usize,
    /// Maximum description/caption length in characters.
    pub max_description_chars: usize,
    /// Recommended video length range, in seconds.
    pub ideal_duration_secs: (u32, u32),
    /// Preferred aspect ratio.
    pub aspect_ratio: &'static str,
    /// Recommended number of hashtags.
    pub hashtag_limit: usize,
    /// Posting hours (UTC) used when no history is available.
    pub default_posting_hours: [u8; 3],
    /// Strongest weekdays.
    pub best_days: &'static [&'static str],
    /// One-line style note fed into prompts.
    pub style_note: &'static str,
}

const PROFILES: [PlatformProfile; 7] = [
    PlatformProfile {
        platform: Platform::Youtube,
        max_title_chars: 100,
        max_description_chars: 5000,
        ideal_duration_secs: (480, 900),
        aspect_ratio: "16:9",
        hashtag_limit: 3,
        default_posting_hours: [14, 16, 20],
        best_days: &["Thursday", "Friday", "Saturday"],
        style_note: "searchable titles, strong retention in the first 30 seconds, chapters",
    },
    PlatformProfile {
        platform: Platform::Tiktok,
        max_title_chars: 150,
        max_description_chars: 2200,
        ideal_duration_secs: (21, 60),
        aspect_ratio: "9:16",
        hashtag_limit: 5,
        default_posting_hours: [7, 19, 21],
        best_days: &["Tuesday", "Thursday", "Friday"],
        style_note: "hook in the first second, trending sounds, fast cuts",
    },
    PlatformProfile {
        platform: Platform::Instagram,
        max_title_chars: 125,
        max_description_chars: 2200,
        ideal_duration_secs: (15, 90),
        aspect_ratio: "9:16",
        hashtag_limit: 10,
        default_posting_hours: [11, 13, 19],
        best_days: &["Monday", "Wednesday", "Friday"],
        style_note: "visual polish, carousel-friendly framing, save-worthy value",
    },
    PlatformProfile {
        platform: Platform::Twitter,
        max_title_chars: 280,
        max_description_chars: 280,
        ideal_duration_secs: (15, 140),
        aspect_ratio: "16:9",
        hashtag_limit: 2,
        default_posting_hours: [9, 12, 17],
        best_days: &["Tuesday", "Wednesday", "Thursday"],
        style_note: "punchy one-liners, threads, timely commentary",
    },
    PlatformProfile {
        platform: Platform::Linkedin,
        max_title_chars: 150,
        max_description_chars: 3000,
        ideal_duration_secs: (30, 180),
        aspect_ratio: "1:1",
        hashtag_limit: 3,
        default_posting_hours: [8, 12, 17],
        best_days: &["Tuesday", "Wednesday", "Thursday"],
        style_note: "professional insight, story-driven lessons, clear takeaway",
    },
    PlatformProfile {
        platform: Platform::Reddit,
        max_title_chars: 300,
        max_description_chars: 40000,
        ideal_duration_secs: (30, 300),
        aspect_ratio: "16:9",
        hashtag_limit: 0,
        default_posting_hours: [6, 8, 12],
        best_days: &["Monday", "Saturday", "Sunday"],
        style_note: "authentic, community-first, no overt promotion",
    },
    PlatformProfile {
        platform: Platform::Google,
        max_title_chars: 60,
        max_description_chars: 160,
        ideal_duration_secs: (60, 600),
        aspect_ratio: "16:9",
        hashtag_limit: 0,
        default_posting_hours: [9, 13, 18],
        best_days: &["Tuesday", "Wednesday", "Thursday"],
        style_note: "answer the search intent directly",
    },
];

/// Returns the profile for a platform.
#[must_use]
pub fn profile(platform: Platform) -> &'static PlatformProfile {
    PROFILES
        .iter()
        .find(|profile| profile.platform == platform)
        .unwrap_or(&PROFILES[0])
}

impl PlatformProfile {
    /// Renders the profile as a short bullet list for prompts.
    #[must_use]
    pub fn prompt_summary(&self) -> String {
        format!(
            "- Platform: {}\n- Title limit: {} characters\n- Ideal length: {}-{} seconds\n- Aspect ratio: {}\n- Hashtags: up to {}\n- Style: {}",
            self.platform.display_name(),
            self.max_title_chars,
            self.ideal_duration_secs.0,
            self.ideal_duration_secs.1,
            self.aspect_ratio,
            self.hashtag_limit,
            self.style_note,
        )
    }
}
