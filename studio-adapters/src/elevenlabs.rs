//! `ElevenLabs` text-to-speech synthesizer.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Request, Uri};
use serde::Serialize;

use crate::http_client::{HyperClient, build_https_client, execute, sanitize_base_url};
use crate::speech::{AudioFormat, SpeechProvider, SpeechRequest, SpeechSynthesizer, wrap_pcm16};
use crate::traits::{AdapterError, AdapterResult};

const PROVIDER: &str = "ElevenLabs";
const PCM_SAMPLE_RATE: u32 = 44_100;
const MIN_SPEED: f32 = 0.7;
const MAX_SPEED: f32 = 1.2;

/// Configuration for [`ElevenLabsSynthesizer`].
#[derive(Clone)]
pub struct ElevenLabsConfig {
    api_key: String,
    base_url: String,
    model_id: String,
    timeout: Duration,
}

impl fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ElevenLabsConfig {
    /// Creates a configuration for the supplied API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.elevenlabs.io/".to_owned(),
            model_id: "eleven_multilingual_v2".to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref(), PROVIDER)?;
        Ok(self)
    }

    /// Overrides the synthesis model.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Sets the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Calls `POST /v1/text-to-speech/{voice_id}`.
pub struct ElevenLabsSynthesizer {
    client: HyperClient,
    config: ElevenLabsConfig,
}

impl fmt::Debug for ElevenLabsSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsSynthesizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElevenLabsSynthesizer {
    /// Creates a synthesizer.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the API key is blank.
    pub fn new(config: ElevenLabsConfig) -> AdapterResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AdapterError::configuration(
                "ElevenLabs synthesizer requires an API key",
            ));
        }
        Ok(Self {
            client: build_https_client()?,
            config,
        })
    }

    fn endpoint(&self, request: &SpeechRequest) -> AdapterResult<Uri> {
        let voice = request.voice_id();
        if voice.is_empty()
            || !voice
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(AdapterError::invalid_request(format!(
                "invalid ElevenLabs voice id `{voice}`"
            )));
        }
        format!(
            "{}v1/text-to-speech/{}?output_format={}",
            self.config.base_url,
            voice,
            output_format(request.format())
        )
        .parse::<Uri>()
        .map_err(|err| AdapterError::invalid_request(format!("invalid ElevenLabs voice id: {err}")))
    }

    fn build_body(&self, request: &SpeechRequest) -> TextToSpeechBody {
        let speed = request.speed().clamp(MIN_SPEED, MAX_SPEED);
        if (speed - request.speed()).abs() > f32::EPSILON {
            tracing::warn!(
                requested = request.speed(),
                applied = speed,
                "ElevenLabs speed out of range, clamping"
            );
        }
        TextToSpeechBody {
            text: request.text().to_owned(),
            model_id: self.config.model_id.clone(),
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
                speed,
            },
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    fn provider(&self) -> SpeechProvider {
        SpeechProvider::Elevenlabs
    }

    async fn synthesize(&self, request: SpeechRequest) -> AdapterResult<Bytes> {
        let body = serde_json::to_vec(&self.build_body(&request)).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode ElevenLabs request: {err}"))
        })?;

        let req = Request::post(self.endpoint(&request)?)
            .header("xi-api-key", &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "audio/*")
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("failed to build ElevenLabs request: {err}"))
            })?;

        let audio = execute(&self.client, req, self.config.timeout, PROVIDER).await?;
        if audio.is_empty() {
            return Err(AdapterError::response("ElevenLabs returned empty audio"));
        }

        Ok(match request.format() {
            AudioFormat::Mp3 => audio,
            AudioFormat::Wav => wrap_pcm16(&audio, PCM_SAMPLE_RATE, 1),
        })
    }
}

#[derive(Debug, Serialize)]
struct TextToSpeechBody {
    text: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    speed: f32,
}

fn output_format(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Mp3 => "mp3_44100_128",
        AudioFormat::Wav => "pcm_44100",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesizer() -> ElevenLabsSynthesizer {
        ElevenLabsSynthesizer::new(ElevenLabsConfig::new("key")).expect("synth")
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = ElevenLabsSynthesizer::new(ElevenLabsConfig::new(" ")).expect_err("blank");
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }

    #[test]
    fn endpoint_carries_voice_and_format() {
        let request = SpeechRequest::new("hi", "voice123", 1.0, AudioFormat::Wav).unwrap();
        let uri = synthesizer().endpoint(&request).unwrap();
        assert_eq!(uri.path(), "/v1/text-to-speech/voice123");
        assert_eq!(uri.query(), Some("output_format=pcm_44100"));
    }

    #[test]
    fn body_clamps_speed_to_provider_range() {
        let request = SpeechRequest::new("hi", "v", 1.25, AudioFormat::Mp3).unwrap();
        let body = serde_json::to_value(synthesizer().build_body(&request)).unwrap();
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert!((body["voice_settings"]["speed"].as_f64().unwrap() - 1.2).abs() < 1e-6);

        let request = SpeechRequest::new("hi", "v", 0.5, AudioFormat::Mp3).unwrap();
        let body = serde_json::to_value(synthesizer().build_body(&request)).unwrap();
        assert!((body["voice_settings"]["speed"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn speed_inside_the_provider_range_is_kept() {
        let request = SpeechRequest::new("hi", "v", 0.75, AudioFormat::Mp3).unwrap();
        let body = serde_json::to_value(synthesizer().build_body(&request)).unwrap();
        assert_eq!(body["voice_settings"]["speed"], 0.75);
    }

    #[test]
    fn endpoint_rejects_path_characters_in_voice() {
        for voice in ["../../v1/user?x=", "a/b", "a b"] {
            let request = SpeechRequest::new("hi", voice, 1.0, AudioFormat::Mp3).unwrap();
            let err = synthesizer().endpoint(&request).expect_err(voice);
            assert!(matches!(err, AdapterError::InvalidRequest { .. }), "{voice}");
        }
    }
}
