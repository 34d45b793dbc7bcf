#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use serde_json::Value;
use studio_adapters::speech::{SpeechProvider, SpeechRequest, SpeechSynthesizer};
use studio_adapters::traits::{
    AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk, InferenceRequest, ModelAdapter,
};
use studio_config::{StaticCredentials, StudioConfig};
use studio_kernel::{ProviderFactory, StudioContext};
use studio_telemetry::RecordingCallLog;
use studio_tools::{Dispatcher, ResponseEnvelope};
use tempfile::TempDir;

pub const FAKE_AUDIO: &[u8] = b"ID3fake-mp3-frames";

struct CannedModel {
    metadata: AdapterMetadata,
    reply: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ModelAdapter for CannedModel {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, _request: InferenceRequest) -> AdapterResult<AdapterStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.clone();
        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(reply, true))
        })))
    }
}

struct RecordingVoice {
    provider: SpeechProvider,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<SpeechRequest>>>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingVoice {
    fn provider(&self) -> SpeechProvider {
        self.provider
    }

    async fn synthesize(&self, request: SpeechRequest) -> AdapterResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        Ok(Bytes::from_static(FAKE_AUDIO))
    }
}

struct CannedFactory {
    reply: String,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<SpeechRequest>>>,
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
        }))
    }

    fn speech(
        &self,
        provider: SpeechProvider,
        _api_key: String,
        _config: &StudioConfig,
    ) -> AdapterResult<Arc<dyn SpeechSynthesizer>> {
        Ok(Arc::new(RecordingVoice {
            provider,
            calls: Arc::clone(&self.calls),
            requests: Arc::clone(&self.requests),
        }))
    }
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub output: TempDir,
    pub log: Arc<RecordingCallLog>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<SpeechRequest>>>,
}

impl Harness {
    pub fn new(reply: &str, credentials: StaticCredentials) -> Self {
        let output = tempfile::tempdir().unwrap();
        let factory = Arc::new(CannedFactory {
            reply: reply.to_owned(),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        });
        let config = StudioConfig::default().with_output_dir(output.path().join("artifacts"));
        let studio = StudioContext::new(config, Arc::new(credentials), factory.clone());
        let log = Arc::new(RecordingCallLog::new());

        Self {
            dispatcher: Dispatcher::new(studio_scripts::registry(&studio).unwrap(), log.clone()),
            output,
            log,
            calls: Arc::clone(&factory.calls),
            requests: Arc::clone(&factory.requests),
        }
    }

    pub async fn call(&self, name: &str, args: Value) -> ResponseEnvelope {
        self.dispatcher.dispatch(name, args).await
    }

    pub fn external_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn speech_requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn error_text(envelope: &ResponseEnvelope) -> String {
    assert!(envelope.is_error(), "expected an error envelope");
    envelope.payload().unwrap()["error"]
        .as_str()
        .unwrap()
        .to_owned()
}
