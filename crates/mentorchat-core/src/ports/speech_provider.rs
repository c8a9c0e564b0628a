//! Speech provider port: the external voice synthesis service.
//!
//! Implemented by `ElevenLabsClient` in `mentorchat-elevenlabs`. The speech
//! synthesis service owns caching and fallback; a provider only turns text
//! into an audio byte stream.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::domain::SynthesisSettings;

/// Audio returned by a provider, in arrival order.
pub type AudioStream = BoxStream<'static, Result<Bytes, ProviderError>>;

/// A single synthesis call to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub voice_id: String,
    pub text: String,
    pub model_id: String,
    pub settings: SynthesisSettings,
}

/// Errors reported by a speech provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credentials are configured for the provider.
    #[error("Speech provider is not configured: {0}")]
    NotConfigured(String),

    /// The request could not be sent or the connection failed.
    #[error("Speech provider request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("Speech provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The audio body failed mid-stream.
    #[error("Speech provider stream failed: {0}")]
    Stream(String),
}

/// Port trait for an external text-to-speech provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechProviderPort: Send + Sync {
    /// Whether credentials are present. Checked before any provider call so
    /// "not configured" can be told apart from a runtime failure.
    fn is_configured(&self) -> bool;

    /// Start synthesis and return the audio body as a stream of chunks.
    async fn synthesize(&self, request: ProviderRequest) -> Result<AudioStream, ProviderError>;
}
