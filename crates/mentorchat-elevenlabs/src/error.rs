//! Internal error types for `ElevenLabs` operations.
//!
//! These errors are internal to `mentorchat-elevenlabs` and are mapped to
//! [`ProviderError`] at the port boundary.

use mentorchat_core::ProviderError;
use thiserror::Error;

pub type ElevenLabsResult<T> = Result<T, ElevenLabsError>;

#[derive(Debug, Error)]
pub enum ElevenLabsError {
    #[error("ElevenLabs API key not configured")]
    MissingApiKey,

    /// Non-success HTTP status. `message` is the API's detail text when it
    /// could be extracted, otherwise the raw body.
    #[error("ElevenLabs API request failed with status {status}: {message}")]
    ApiRequestFailed { status: u16, message: String },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<ElevenLabsError> for ProviderError {
    fn from(err: ElevenLabsError) -> Self {
        match err {
            ElevenLabsError::MissingApiKey => {
                Self::NotConfigured("ElevenLabs API key not configured".to_string())
            }
            ElevenLabsError::ApiRequestFailed { status, message } => Self::Api { status, message },
            ElevenLabsError::Network(e) => Self::Request(e.to_string()),
            ElevenLabsError::InvalidUrl(e) => Self::Request(format!("invalid URL: {e}")),
        }
    }
}
