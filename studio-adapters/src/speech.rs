//! Text-to-speech port shared by the speech providers.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::traits::{AdapterError, AdapterResult};

/// Supported speech providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    /// `ElevenLabs` text-to-speech.
    Elevenlabs,
    /// `OpenAI` `audio/speech`.
    Openai,
}

impl SpeechProvider {
    /// Wire names, in declaration order.
    pub const NAMES: [&'static str; 2] = ["elevenlabs", "openai"];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Elevenlabs => "elevenlabs",
            Self::Openai => "openai",
        }
    }

    /// Voice used when the caller does not pick one.
    #[must_use]
    pub const fn default_voice(self) -> &'static str {
        match self {
            Self::Elevenlabs => "21m00Tcm4TlvDq8ikWAM",
            Self::Openai => "alloy",
        }
    }
}

impl fmt::Display for SpeechProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeechProvider {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elevenlabs" => Ok(Self::Elevenlabs),
            "openai" => Ok(Self::Openai),
            other => Err(AdapterError::invalid_request(format!(
                "unknown speech provider `{other}`"
            ))),
        }
    }
}

/// Container format of synthesized audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG layer 3.
    Mp3,
    /// 16-bit PCM in a RIFF/WAVE container.
    Wav,
}

impl AudioFormat {
    /// Wire names, in declaration order.
    pub const NAMES: [&'static str; 2] = ["mp3", "wav"];

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

/// Parameters for one synthesis call.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechRequest {
    text: String,
    voice_id: String,
    speed: f32,
    format: AudioFormat,
}

impl SpeechRequest {
    /// Creates a request.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidRequest`] when the text is blank.
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        speed: f32,
        format: AudioFormat,
    ) -> AdapterResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AdapterError::invalid_request("speech text cannot be empty"));
        }
        Ok(Self {
            text,
            voice_id: voice_id.into(),
            speed,
            format,
        })
    }

    /// Script text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Provider-specific voice identifier.
    #[must_use]
    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    /// Playback speed multiplier.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Requested container format.
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }
}

/// Trait implemented by text-to-speech providers.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Provider identity.
    fn provider(&self) -> SpeechProvider;

    /// Synthesizes the request into encoded audio bytes.
    async fn synthesize(&self, request: SpeechRequest) -> AdapterResult<Bytes>;
}

/// Wraps little-endian 16-bit PCM samples in a RIFF/WAVE header.
#[must_use]
pub fn wrap_pcm16(pcm: &[u8], sample_rate: u32, channels: u16) -> Bytes {
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX);

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    Bytes::from(out)
}
