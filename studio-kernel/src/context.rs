//! Shared capabilities handed to every tool handler.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use studio_adapters::elevenlabs::{ElevenLabsConfig, ElevenLabsSynthesizer};
use studio_adapters::gemini::{GeminiAdapter, GeminiConfig};
use studio_adapters::openai::{OpenAiSpeechConfig, OpenAiSpeechSynthesizer};
use studio_adapters::speech::{SpeechProvider, SpeechRequest, SpeechSynthesizer};
use studio_adapters::traits::{
    AdapterError, AdapterResult, InferenceRequest, ModelAdapter, collect_text,
};
use studio_adapters::trends::TrendScraper;
use studio_config::{
    CredentialSource, ELEVENLABS_API_KEY, EnvCredentials, GEMINI_API_KEY, OPENAI_API_KEY,
    StudioConfig,
};
use studio_primitives::Platform;
use studio_tools::{CallContext, ToolError, ToolResult};
use tokio::time::timeout;

/// Builds provider clients once a credential has been resolved.
pub trait ProviderFactory: Send + Sync {
    /// Creates the generative-text model.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the client cannot be configured.
    fn text_model(
        &self,
        api_key: String,
        config: &StudioConfig,
    ) -> AdapterResult<Arc<dyn ModelAdapter>>;

    /// Creates a speech synthesizer for the provider.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the client cannot be configured.
    fn speech(
        &self,
        provider: SpeechProvider,
        api_key: String,
        config: &StudioConfig,
    ) -> AdapterResult<Arc<dyn SpeechSynthesizer>>;
}

/// Factory for the real HTTPS providers.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiveProviders;

impl ProviderFactory for LiveProviders {
    fn text_model(
        &self,
        api_key: String,
        config: &StudioConfig,
    ) -> AdapterResult<Arc<dyn ModelAdapter>> {
        let gemini = GeminiConfig::new(config.gemini_model())
            .with_api_key(api_key)
            .with_timeout(config.provider_timeout())
            .with_temperature(0.8)
            .with_json_output(true);
        Ok(Arc::new(GeminiAdapter::new(gemini)?))
    }

    fn speech(
        &self,
        provider: SpeechProvider,
        api_key: String,
        config: &StudioConfig,
    ) -> AdapterResult<Arc<dyn SpeechSynthesizer>> {
        Ok(match provider {
            SpeechProvider::Elevenlabs => Arc::new(ElevenLabsSynthesizer::new(
                ElevenLabsConfig::new(api_key).with_timeout(config.provider_timeout()),
            )?),
            SpeechProvider::Openai => Arc::new(OpenAiSpeechSynthesizer::new(
                OpenAiSpeechConfig::new(api_key).with_timeout(config.provider_timeout()),
            )?),
        })
    }
}

/// Credential variable for a speech provider.
#[must_use]
pub const fn speech_credential(provider: SpeechProvider) -> &'static str {
    match provider {
        SpeechProvider::Elevenlabs => ELEVENLABS_API_KEY,
        SpeechProvider::Openai => OPENAI_API_KEY,
    }
}

/// Configuration plus the external capabilities a server may use.
#[derive(Clone)]
pub struct StudioContext {
    config: Arc<StudioConfig>,
    credentials: Arc<dyn CredentialSource>,
    providers: Arc<dyn ProviderFactory>,
    trends: Arc<TrendScraper>,
}

impl fmt::Debug for StudioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudioContext")
            .field("config", &self.config)
            .field("trends", &self.trends)
            .finish_non_exhaustive()
    }
}

impl StudioContext {
    /// Creates a context with no trend sources.
    #[must_use]
    pub fn new(
        config: StudioConfig,
        credentials: Arc<dyn CredentialSource>,
        providers: Arc<dyn ProviderFactory>,
    ) -> Self {
        tracing::debug!(?config, "configuration loaded");
        Self {
            config: Arc::new(config),
            credentials,
            providers,
            trends: Arc::new(TrendScraper::new()),
        }
    }

    /// Production wiring: process-environment credentials, live providers
    /// and the public trend endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] when the HTTPS client cannot be built.
    pub fn live(config: StudioConfig) -> AdapterResult<Self> {
        let trends = TrendScraper::standard(config.provider_timeout())?;
        Ok(Self::new(config, Arc::new(EnvCredentials), Arc::new(LiveProviders))
            .with_trends(trends))
    }

    /// Replaces the trend scraper.
    #[must_use]
    pub fn with_trends(mut self, trends: TrendScraper) -> Self {
        self.trends = Arc::new(trends);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Resolves a credential at call time.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] when the credential is unset.
    pub fn require_credential(&self, name: &str) -> ToolResult<String> {
        self.credentials
            .resolve(name)
            .ok_or_else(|| ToolError::configuration(format!("{name} is not set")))
    }

    /// Resolves `GEMINI_API_KEY` and builds the text model.
    ///
    /// Handlers call this before any other external work so a missing
    /// credential fails the call without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] when the credential is unset or the
    /// client cannot be configured.
    pub fn text_model(&self) -> ToolResult<TextModel> {
        let api_key = self.require_credential(GEMINI_API_KEY)?;
        let adapter = self
            .providers
            .text_model(api_key, &self.config)
            .map_err(|err| adapter_error("text model", &err))?;
        Ok(TextModel {
            adapter,
            deadline: self.config.provider_timeout(),
        })
    }

    /// Shorthand for [`Self::text_model`] followed by [`TextModel::complete`].
    ///
    /// # Errors
    ///
    /// See [`Self::text_model`] and [`TextModel::complete`].
    pub async fn generate_text(
        &self,
        ctx: &CallContext,
        system_prompt: &str,
        prompt: String,
    ) -> ToolResult<String> {
        self.text_model()?.complete(ctx, system_prompt, prompt).await
    }

    /// Synthesizes speech with the chosen provider.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Configuration`] when the provider credential is
    /// unset and [`ToolError::Provider`] when synthesis fails or times out.
    pub async fn synthesize(
        &self,
        ctx: &CallContext,
        provider: SpeechProvider,
        request: SpeechRequest,
    ) -> ToolResult<Bytes> {
        let api_key = self.require_credential(speech_credential(provider))?;
        let synthesizer = self
            .providers
            .speech(provider, api_key, &self.config)
            .map_err(|err| adapter_error(provider.as_str(), &err))?;

        ctx.debug(&format!("synthesizing {} characters via {provider}", request.text().len()));
        let deadline = self.config.provider_timeout();
        timeout(deadline, synthesizer.synthesize(request))
            .await
            .map_err(|_| {
                ToolError::provider(provider.as_str(), format!("no audio within {deadline:?}"))
            })?
            .map_err(|err| adapter_error(provider.as_str(), &err))
    }

    /// Collects trending topics; failing sources are logged and skipped.
    pub async fn trending_topics(
        &self,
        ctx: &CallContext,
        niche: &str,
        platforms: &[Platform],
    ) -> Vec<String> {
        let report = self.trends.scrape(niche, platforms).await;
        for failure in &report.failures {
            ctx.warn(&format!(
                "trend source {} skipped: {}",
                failure.platform, failure.reason
            ));
        }
        ctx.debug(&format!("collected {} trending topics", report.topics.len()));
        report.topics
    }

    /// Writes an artifact into the output directory and returns its path.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Execution`] when the directory or file cannot be written.
    pub async fn write_artifact(
        &self,
        ctx: &CallContext,
        file_name: &str,
        contents: &[u8],
    ) -> ToolResult<PathBuf> {
        let dir = self.config.output_dir();
        tokio::fs::create_dir_all(dir).await.map_err(|err| {
            ToolError::execution(format!("cannot create {}: {err}", dir.display()))
        })?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, contents).await.map_err(|err| {
            ToolError::execution(format!("cannot write {}: {err}", path.display()))
        })?;
        ctx.info(&format!("wrote {} bytes to {}", contents.len(), path.display()));
        Ok(path)
    }
}

/// A configured text model bound to the provider deadline.
#[derive(Clone)]
pub struct TextModel {
    adapter: Arc<dyn ModelAdapter>,
    deadline: Duration,
}

impl fmt::Debug for TextModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextModel")
            .field("metadata", self.adapter.metadata())
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl TextModel {
    /// Sends one prompt and returns the model's raw reply.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Provider`] when the model fails or misses the deadline.
    pub async fn complete(
        &self,
        ctx: &CallContext,
        system_prompt: &str,
        prompt: String,
    ) -> ToolResult<String> {
        let metadata = self.adapter.metadata();
        let provider = metadata.provider();
        let request = InferenceRequest::from_prompt(prompt)
            .map_err(|err| adapter_error(provider, &err))?
            .with_system_prompt(system_prompt);

        ctx.debug(&format!(
            "requesting completion from {provider}/{}",
            metadata.model()
        ));
        let deadline = self.deadline;
        let text = timeout(deadline, async {
            let stream = self.adapter.infer(request).await?;
            collect_text(stream).await
        })
        .await
        .map_err(|_| ToolError::provider(provider, format!("no reply within {deadline:?}")))?
        .map_err(|err| adapter_error(provider, &err))?;

        ctx.debug(&format!("received {} characters", text.len()));
        Ok(text)
    }
}

fn adapter_error(provider: &str, err: &AdapterError) -> ToolError {
    match err {
        AdapterError::Configuration { reason } => ToolError::configuration(reason.clone()),
        other => ToolError::provider(provider, other),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures::stream;
    use studio_adapters::speech::AudioFormat;
    use studio_adapters::traits::{AdapterMetadata, AdapterStream, InferenceChunk};
    use studio_config::StaticCredentials;
    use studio_primitives::TraceId;
    use studio_telemetry::RecordingCallLog;

    use super::*;

    struct SlowModel {
        metadata: AdapterMetadata,
        delay: Duration,
    }

    #[async_trait]
    impl ModelAdapter for SlowModel {
        fn metadata(&self) -> &AdapterMetadata {
            &self.metadata
        }

        async fn infer(&self, _request: InferenceRequest) -> AdapterResult<AdapterStream> {
            tokio::time::sleep(self.delay).await;
            Ok(Box::pin(stream::once(async {
                Ok(InferenceChunk::new("{\"ok\":true}", true))
            })))
        }
    }

    struct Factory {
        delay: Duration,
        built: AtomicUsize,
    }

    impl ProviderFactory for Factory {
        fn text_model(
            &self,
            _api_key: String,
            _config: &StudioConfig,
        ) -> AdapterResult<Arc<dyn ModelAdapter>> {
            self.built.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(SlowModel {
                metadata: AdapterMetadata::new("mock", "m"),
                delay: self.delay,
            }))
        }

        fn speech(
            &self,
            _provider: SpeechProvider,
            _api_key: String,
            _config: &StudioConfig,
        ) -> AdapterResult<Arc<dyn SpeechSynthesizer>> {
            self.built.fetch_add(1, Ordering::SeqCst);
            Err(AdapterError::configuration("speech disabled"))
        }
    }

    fn studio(delay: Duration, credentials: StaticCredentials) -> (StudioContext, Arc<Factory>) {
        let factory = Arc::new(Factory {
            delay,
            built: AtomicUsize::new(0),
        });
        let config = StudioConfig::default().with_provider_timeout(Duration::from_millis(50));
        let studio = StudioContext::new(config, Arc::new(credentials), factory.clone());
        (studio, factory)
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn configuration_is_logged_once_a_subscriber_is_installed() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let config = StudioConfig::default().with_gemini_model("gemini-test-model");
            let _studio = StudioContext::new(
                config,
                Arc::new(StaticCredentials::new()),
                Arc::new(Factory {
                    delay: Duration::ZERO,
                    built: AtomicUsize::new(0),
                }),
            );
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("configuration loaded"));
        assert!(output.contains("gemini-test-model"));
    }

    fn call() -> CallContext {
        CallContext::new(TraceId::random(), "t", Arc::new(RecordingCallLog::new()))
    }

    #[tokio::test]
    async fn missing_key_never_builds_a_provider() {
        let (studio, factory) = studio(Duration::ZERO, StaticCredentials::new());
        let err = studio
            .generate_text(&call(), "sys", "prompt".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Configuration { .. }));
        assert!(err.to_string().contains(GEMINI_API_KEY));

        let request = SpeechRequest::new("hi", "v", 1.0, AudioFormat::Mp3).unwrap();
        let err = studio
            .synthesize(&call(), SpeechProvider::Openai, request)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY));
        assert_eq!(factory.built.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn returns_model_text() {
        let (studio, _) = studio(
            Duration::ZERO,
            StaticCredentials::new().with(GEMINI_API_KEY, "k"),
        );
        let text = studio
            .generate_text(&call(), "sys", "prompt".into())
            .await
            .unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn slow_provider_hits_the_deadline() {
        let (studio, _) = studio(
            Duration::from_secs(5),
            StaticCredentials::new().with(GEMINI_API_KEY, "k"),
        );
        let err = studio
            .generate_text(&call(), "sys", "prompt".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Provider { .. }));
    }

    #[tokio::test]
    async fn writes_artifacts_under_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StudioConfig::default().with_output_dir(dir.path().join("nested"));
        let studio = StudioContext::new(
            config,
            Arc::new(StaticCredentials::new()),
            Arc::new(LiveProviders),
        );
        let path = studio
            .write_artifact(&call(), "a.edl", b"TITLE: x\n")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("nested").join("a.edl"));
        assert_eq!(std::fs::read(path).unwrap(), b"TITLE: x\n");
    }
}
