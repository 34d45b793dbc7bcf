//! Platforms that content is published to or trends are sourced from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A social or search platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Long-form and Shorts video.
    Youtube,
    /// Short vertical video.
    Tiktok,
    /// Reels, stories and feed posts.
    Instagram,
    /// Short text posts and clips.
    Twitter,
    /// Professional network posts.
    Linkedin,
    /// Community discussions; used as a trend source.
    Reddit,
    /// Search interest; used as a trend source.
    Google,
}

impl Platform {
    /// Every platform, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Youtube,
        Self::Tiktok,
        Self::Instagram,
        Self::Twitter,
        Self::Linkedin,
        Self::Reddit,
        Self::Google,
    ];

    /// Platforms that content can be published to.
    pub const PUBLISHING: [Self; 5] = [
        Self::Youtube,
        Self::Tiktok,
        Self::Instagram,
        Self::Twitter,
        Self::Linkedin,
    ];

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
            Self::Instagram => "instagram",
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Reddit => "reddit",
            Self::Google => "google",
        }
    }

    /// Returns the human-facing display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Tiktok => "TikTok",
            Self::Instagram => "Instagram",
            Self::Twitter => "X (Twitter)",
            Self::Linkedin => "LinkedIn",
            Self::Reddit => "Reddit",
            Self::Google => "Google",
        }
    }

    /// Wire names of every platform, for schema enums.
    #[must_use]
    pub fn names(platforms: &[Self]) -> Vec<&'static str> {
        platforms.iter().map(|platform| platform.as_str()).collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownPlatform { name: s.to_owned() })
    }
}
