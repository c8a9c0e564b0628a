//! HTTP client for the `ElevenLabs` text-to-speech endpoint.

use mentorchat_core::ProviderRequest;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::config::ElevenLabsConfig;
use crate::error::{ElevenLabsError, ElevenLabsResult};
use crate::models::{TextToSpeechBody, error_message};
use crate::url::build_tts_url;

const API_KEY_HEADER: &str = "xi-api-key";

/// `ElevenLabs` client.
///
/// Constructed once at process start from an [`ElevenLabsConfig`] and shared
/// behind an `Arc`. Interact with it through
/// [`SpeechProviderPort`](mentorchat_core::SpeechProviderPort).
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    http: reqwest::Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> ElevenLabsResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("audio/mpeg"));

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &ElevenLabsConfig {
        &self.config
    }

    /// Send a synthesis request and return the response once headers arrive.
    ///
    /// The body has not been read yet; a non-success status is turned into
    /// [`ElevenLabsError::ApiRequestFailed`] with the API's error detail.
    pub(crate) async fn start_synthesis(
        &self,
        request: &ProviderRequest,
    ) -> ElevenLabsResult<reqwest::Response> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ElevenLabsError::MissingApiKey)?;

        let url = build_tts_url(
            &self.config.base_url,
            &request.voice_id,
            &self.config.output_format,
        )?;

        tracing::debug!(
            voice_id = %request.voice_id,
            model_id = %request.model_id,
            chars = request.text.chars().count(),
            "Requesting ElevenLabs synthesis"
        );

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&TextToSpeechBody::from(request))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ElevenLabsError::ApiRequestFailed {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorchat_core::SynthesisSettings;

    fn request() -> ProviderRequest {
        ProviderRequest {
            voice_id: "voice".to_string(),
            text: "Hello".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            settings: SynthesisSettings {
                stability: 0.5,
                similarity_boost: 0.75,
                style: 0.0,
                use_speaker_boost: true,
            },
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        // Unroutable host: any network attempt would surface as Network, not MissingApiKey.
        let client =
            ElevenLabsClient::new(ElevenLabsConfig::new().with_base_url("http://192.0.2.1:1"))
                .unwrap();
        let err = client.start_synthesis(&request()).await.unwrap_err();
        assert!(matches!(err, ElevenLabsError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_bad_base_url_is_reported() {
        let client = ElevenLabsClient::new(
            ElevenLabsConfig::new()
                .with_base_url("::not a url::")
                .with_api_key("k"),
        )
        .unwrap();
        let err = client.start_synthesis(&request()).await.unwrap_err();
        assert!(matches!(err, ElevenLabsError::InvalidUrl(_)));
    }
}
