//! `OpenAI` speech synthesizer backed by `POST /v1/audio/speech`.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Request, Uri};
use serde::Serialize;

use crate::http_client::{HyperClient, build_https_client, execute, sanitize_base_url};
use crate::speech::{AudioFormat, SpeechProvider, SpeechRequest, SpeechSynthesizer};
use crate::traits::{AdapterError, AdapterResult};

const PROVIDER: &str = "OpenAI";

/// Configuration for the `OpenAI` speech synthesizer.
#[derive(Clone)]
pub struct OpenAiSpeechConfig {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl fmt::Debug for OpenAiSpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSpeechConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiSpeechConfig {
    /// Creates a configuration for the supplied API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "tts-1".to_owned(),
            base_url: "https://api.openai.com/".to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref(), PROVIDER)?;
        Ok(self)
    }

    /// Overrides the speech model (e.g. `tts-1-hd`).
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `OpenAI` synthesizer that calls the official API over HTTPS.
pub struct OpenAiSpeechSynthesizer {
    client: HyperClient,
    endpoint: Uri,
    config: OpenAiSpeechConfig,
}

impl fmt::Debug for OpenAiSpeechSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSpeechSynthesizer")
            .field("model", &self.config.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiSpeechSynthesizer {
    /// Constructs a new synthesizer with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the API key is blank or the
    /// endpoint cannot be built.
    pub fn new(config: OpenAiSpeechConfig) -> AdapterResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AdapterError::configuration(
                "OpenAI synthesizer requires an API key",
            ));
        }

        let endpoint = format!("{}v1/audio/speech", config.base_url)
            .parse::<Uri>()
            .map_err(|err| {
                AdapterError::configuration(format!("invalid OpenAI endpoint: {err}"))
            })?;

        Ok(Self {
            client: build_https_client()?,
            endpoint,
            config,
        })
    }

    fn build_request(&self, request: &SpeechRequest) -> SpeechBody {
        SpeechBody {
            model: self.config.model.clone(),
            input: request.text().to_owned(),
            voice: request.voice_id().to_owned(),
            speed: request.speed(),
            response_format: request.format().extension(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechSynthesizer {
    fn provider(&self) -> SpeechProvider {
        SpeechProvider::Openai
    }

    async fn synthesize(&self, request: SpeechRequest) -> AdapterResult<Bytes> {
        let payload = self.build_request(&request);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode OpenAI request: {err}"))
        })?;

        let req = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("failed to build OpenAI request: {err}"))
            })?;

        let audio = execute(&self.client, req, self.config.timeout, PROVIDER).await?;
        if audio.is_empty() {
            return Err(AdapterError::response("OpenAI returned empty audio"));
        }
        Ok(audio)
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody {
    model: String,
    input: String,
    voice: String,
    speed: f32,
    response_format: &'static str,
}
