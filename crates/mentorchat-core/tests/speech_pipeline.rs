//! Integration tests for the speech synthesis pipeline.
//!
//! Exercises the service through its public API with a counting provider and
//! a real cache directory.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use mentorchat_core::services::filename_for;
use mentorchat_core::{
    AudioStream, PersonaId, PersonaRegistry, ProviderError, ProviderRequest, SpeechCache,
    SpeechProviderPort, SpeechSynthesisService, SynthesisConfig, SynthesisRequest,
    SynthesisResult,
};

/// Provider that counts calls and returns a fixed two-chunk body.
struct CountingProvider {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingProvider {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProviderPort for CountingProvider {
    fn is_configured(&self) -> bool {
        true
    }

    async fn synthesize(&self, request: ProviderRequest) -> Result<AudioStream, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Request("connection refused".to_string()));
        }
        let body = vec![
            Ok(Bytes::from(format!("{}:", request.voice_id))),
            Ok(Bytes::from(request.text)),
        ];
        Ok(futures_util::stream::iter(body).boxed())
    }
}

fn service_at(provider: Arc<CountingProvider>, dir: &std::path::Path) -> SpeechSynthesisService {
    SpeechSynthesisService::new(
        provider,
        Arc::new(PersonaRegistry::default()),
        SpeechCache::in_public_dir(dir),
        SynthesisConfig::default(),
    )
}

#[tokio::test]
async fn test_cache_survives_service_restart() {
    let public = tempfile::tempdir().unwrap();
    let request = SynthesisRequest::new("Code karo, seekho", PersonaId::Hitesh);

    let first_provider = CountingProvider::new(false);
    let first = service_at(Arc::clone(&first_provider), public.path())
        .synthesize(&request)
        .await
        .unwrap();

    let second_provider = CountingProvider::new(false);
    let second = service_at(Arc::clone(&second_provider), public.path())
        .synthesize(&request)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first_provider.calls(), 1);
    assert_eq!(second_provider.calls(), 0);

    let filename = filename_for(&request.text, PersonaId::Hitesh);
    let stored = std::fs::read(public.path().join("generated-audio").join(&filename)).unwrap();
    assert_eq!(stored, b"default_voice_id:Code karo, seekho");
}

#[tokio::test]
async fn test_personas_are_cached_independently() {
    let public = tempfile::tempdir().unwrap();
    let provider = CountingProvider::new(false);
    let svc = service_at(Arc::clone(&provider), public.path());

    let a = svc
        .synthesize(&SynthesisRequest::new("Namaste", PersonaId::Hitesh))
        .await
        .unwrap();
    let b = svc
        .synthesize(&SynthesisRequest::new("Namaste", PersonaId::Piyush))
        .await
        .unwrap();

    assert_ne!(a.audio_url(), b.audio_url());
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_failed_generation_is_retried_on_next_request() {
    let public = tempfile::tempdir().unwrap();
    let request = SynthesisRequest::new("Retry me", PersonaId::Piyush);

    let failing = CountingProvider::new(true);
    let result = service_at(Arc::clone(&failing), public.path())
        .synthesize(&request)
        .await
        .unwrap();
    let SynthesisResult::Fallback { voice_config, .. } = result else {
        panic!("expected fallback");
    };
    assert_eq!(voice_config.voice_index, 1);

    let healthy = CountingProvider::new(false);
    let result = service_at(Arc::clone(&healthy), public.path())
        .synthesize(&request)
        .await
        .unwrap();
    assert!(!result.is_fallback());
    assert_eq!(healthy.calls(), 1);
}
