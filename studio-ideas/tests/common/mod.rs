#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use serde_json::Value;
use studio_adapters::speech::{SpeechProvider, SpeechSynthesizer};
use studio_adapters::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk,
    InferenceRequest, ModelAdapter,
};
use studio_adapters::trends::{TrendScraper, TrendSource};
use studio_config::{GEMINI_API_KEY, StaticCredentials, StudioConfig};
use studio_kernel::{ProviderFactory, StudioContext};
use studio_primitives::Platform;
use studio_telemetry::RecordingCallLog;
use studio_tools::{Dispatcher, ResponseEnvelope};

pub struct CannedModel {
    metadata: AdapterMetadata,
    reply: String,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ModelAdapter for CannedModel {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt().to_owned());
        let reply = self.reply.clone();
        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(reply, true))
        })))
    }
}

pub struct CannedFactory {
    reply: String,
    pub calls: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ProviderFactory for CannedFactory {
    fn text_model(
        &self,
        _api_key: String,
        _config: &StudioConfig,
    ) -> AdapterResult<Arc<dyn ModelAdapter>> {
        Ok(Arc::new(CannedModel {
            metadata: AdapterMetadata::new("canned", "test"),
            reply: self.reply.clone(),
            calls: Arc::clone(&self.calls),
            prompts: Arc::clone(&self.prompts),
        }))
    }

    fn speech(
        &self,
        _provider: SpeechProvider,
        _api_key: String,
        _config: &StudioConfig,
    ) -> AdapterResult<Arc<dyn SpeechSynthesizer>> {
        Err(AdapterError::configuration("speech is not used here"))
    }
}

pub struct FixedSource {
    platform: Platform,
    topics: Option<Vec<&'static str>>,
    calls: Arc<AtomicUsize>,
}

impl FixedSource {
    pub fn new(platform: Platform, topics: &[&'static str], calls: &Arc<AtomicUsize>) -> Arc<Self> {
        Arc::new(Self {
            platform,
            topics: Some(topics.to_vec()),
            calls: Arc::clone(calls),
        })
    }

    pub fn failing(platform: Platform, calls: &Arc<AtomicUsize>) -> Arc<Self> {
        Arc::new(Self {
            platform,
            topics: None,
            calls: Arc::clone(calls),
        })
    }
}

#[async_trait]
impl TrendSource for FixedSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, _niche: &str) -> AdapterResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.topics {
            Some(topics) => Ok(topics.iter().map(|t| (*t).to_owned()).collect()),
            None => Err(AdapterError::transport("connection reset")),
        }
    }
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub model_calls: Arc<AtomicUsize>,
    pub trend_calls: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub log: Arc<RecordingCallLog>,
}

impl Harness {
    pub fn new(reply: &str) -> Self {
        Self::build(reply, StaticCredentials::new().with(GEMINI_API_KEY, "test-key"))
    }

    pub fn without_key(reply: &str) -> Self {
        Self::build(reply, StaticCredentials::new())
    }

    pub fn with_topics(reply: &str, topics: &[&'static str]) -> Self {
        let trend_calls = Arc::new(AtomicUsize::new(0));
        let trends =
            TrendScraper::new().with_source(FixedSource::new(Platform::Youtube, topics, &trend_calls));
        Self::with_scraper(
            reply,
            StaticCredentials::new().with(GEMINI_API_KEY, "test-key"),
            trends,
            trend_calls,
        )
    }

    fn build(reply: &str, credentials: StaticCredentials) -> Self {
        let trend_calls = Arc::new(AtomicUsize::new(0));
        let trends = TrendScraper::new()
            .with_source(FixedSource::new(
                Platform::Youtube,
                &["espresso at home", "latte art"],
                &trend_calls,
            ))
            .with_source(FixedSource::failing(Platform::Reddit, &trend_calls))
            .with_source(FixedSource::new(
                Platform::Google,
                &["Latte Art", "grinder reviews"],
                &trend_calls,
            ));
        Self::with_scraper(reply, credentials, trends, trend_calls)
    }

    fn with_scraper(
        reply: &str,
        credentials: StaticCredentials,
        trends: TrendScraper,
        trend_calls: Arc<AtomicUsize>,
    ) -> Self {
        let factory = Arc::new(CannedFactory {
            reply: reply.to_owned(),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        });
        let studio = StudioContext::new(
            StudioConfig::default(),
            Arc::new(credentials),
            factory.clone(),
        )
        .with_trends(trends);
        let log = Arc::new(RecordingCallLog::new());
        let registry = studio_ideas::registry(&studio).unwrap();

        Self {
            dispatcher: Dispatcher::new(registry, log.clone()),
            model_calls: Arc::clone(&factory.calls),
            trend_calls,
            prompts: Arc::clone(&factory.prompts),
            log,
        }
    }

    pub async fn call(&self, name: &str, args: Value) -> ResponseEnvelope {
        self.dispatcher.dispatch(name, args).await
    }

    pub fn model_calls(&self) -> usize {
        self.model_calls.load(Ordering::SeqCst)
    }

    pub fn trend_calls(&self) -> usize {
        self.trend_calls.load(Ordering::SeqCst)
    }
}

pub fn error_text(envelope: &ResponseEnvelope) -> String {
    assert!(envelope.is_error(), "expected an error envelope");
    envelope.payload().unwrap()["error"]
        .as_str()
        .unwrap()
        .to_owned()
}
