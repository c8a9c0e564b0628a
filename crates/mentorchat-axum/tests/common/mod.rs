//! Shared fixtures for mentorchat-axum integration tests.
//!
//! Builds an [`AxumContext`] around a hand-written speech provider so the
//! router can be exercised without network access.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use http_body_util::BodyExt;
use mentorchat_axum::{AxumContext, ChatUpstream, ChatUpstreamConfig};
use mentorchat_core::{
    AudioStream, PersonaRegistry, ProviderError, ProviderRequest, SpeechCache,
    SpeechProviderPort, SpeechSynthesisService, SynthesisConfig,
};

pub const FAKE_AUDIO: &[u8] = b"ID3\x04fake-mp3-frames";

/// How the fake provider behaves.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Healthy,
    Failing,
    Unconfigured,
}

/// Speech provider that counts calls.
pub struct FakeProvider {
    mode: ProviderMode,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(mode: ProviderMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProviderPort for FakeProvider {
    fn is_configured(&self) -> bool {
        self.mode != ProviderMode::Unconfigured
    }

    async fn synthesize(&self, _request: ProviderRequest) -> Result<AudioStream, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            ProviderMode::Healthy => {
                let (head, tail) = FAKE_AUDIO.split_at(4);
                let chunks = vec![Ok(Bytes::from_static(head)), Ok(Bytes::from_static(tail))];
                Ok(futures_util::stream::iter(chunks).boxed())
            }
            ProviderMode::Failing => Err(ProviderError::Api {
                status: 401,
                message: "Invalid API key".to_string(),
            }),
            ProviderMode::Unconfigured => Err(ProviderError::NotConfigured("no key".to_string())),
        }
    }
}

/// Context with the given provider and chat upstream, serving `public_dir`.
pub fn context(
    provider: Arc<FakeProvider>,
    public_dir: &Path,
    chat: ChatUpstreamConfig,
) -> AxumContext {
    let personas = Arc::new(PersonaRegistry::default());
    let speech = Arc::new(SpeechSynthesisService::new(
        provider,
        Arc::clone(&personas),
        SpeechCache::in_public_dir(public_dir),
        SynthesisConfig::default(),
    ));
    AxumContext {
        personas,
        speech,
        chat: Arc::new(ChatUpstream::new(chat).unwrap()),
        public_dir: public_dir.to_path_buf(),
    }
}

pub async fn body_bytes(response: axum::response::Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
