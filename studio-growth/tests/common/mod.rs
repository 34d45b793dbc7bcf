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
use studio_config::{GEMINI_API_KEY, StaticCredentials, StudioConfig};
use studio_kernel::{ProviderFactory, StudioContext};
use studio_telemetry::RecordingCallLog;
use studio_tools::{Dispatcher, ResponseEnvelope};

struct CannedModel {
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

struct CannedFactory {
    reply: String,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
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

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub log: Arc<RecordingCallLog>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    pub fn new(reply: &str) -> Self {
        Self::build(reply, StaticCredentials::new().with(GEMINI_API_KEY, "k"))
    }

    pub fn without_key(reply: &str) -> Self {
        Self::build(reply, StaticCredentials::new())
    }

    fn build(reply: &str, credentials: StaticCredentials) -> Self {
        let factory = Arc::new(CannedFactory {
            reply: reply.to_owned(),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        });
        let studio = StudioContext::new(
            StudioConfig::default(),
            Arc::new(credentials),
            factory.clone(),
        );
        let log = Arc::new(RecordingCallLog::new());
        Self {
            dispatcher: Dispatcher::new(studio_growth::registry(&studio).unwrap(), log.clone()),
            log,
            calls: Arc::clone(&factory.calls),
            prompts: Arc::clone(&factory.prompts),
        }
    }

    pub async fn call(&self, name: &str, args: Value) -> ResponseEnvelope {
        self.dispatcher.dispatch(name, args).await
    }

    pub fn model_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

pub fn error_text(envelope: &ResponseEnvelope) -> String {
    assert!(envelope.is_error(), "expected an error envelope");
    envelope.payload().unwrap()["error"]
        .as_str()
        .unwrap()
        .to_owned()
}
