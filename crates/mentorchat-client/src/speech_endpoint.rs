//! HTTP client for the speech endpoint (`/api/tts`).

use std::time::Duration;

use async_trait::async_trait;
use mentorchat_core::contracts::http::{TTS_PATH, TtsRequestBody, TtsResponse, TtsStatusResponse};
use mentorchat_core::{PersonaId, SynthesisResult};
use reqwest::Url;

use crate::error::PlaybackError;
use crate::playback::SpeechEndpoint;

/// Speech endpoint of a running mentorchat server.
///
/// Relative audio URLs in the response are resolved against the server
/// origin so audio outputs receive an absolute URL.
#[derive(Debug, Clone)]
pub struct HttpSpeechEndpoint {
    http: reqwest::Client,
    base: Url,
}

impl HttpSpeechEndpoint {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, PlaybackError> {
        let base = Url::parse(base_url).map_err(|e| PlaybackError::InvalidUrl(e.to_string()))?;
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { http, base })
    }

    /// `GET /api/tts`: personas and model the server is ready to speak with.
    pub async fn status(&self) -> Result<TtsStatusResponse, PlaybackError> {
        let response = self.http.get(self.resolve(TTS_PATH)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), response).await);
        }
        Ok(response.json().await?)
    }

    fn resolve(&self, path: &str) -> Result<Url, PlaybackError> {
        self.base
            .join(path)
            .map_err(|e| PlaybackError::InvalidUrl(format!("{path}: {e}")))
    }
}

#[async_trait]
impl SpeechEndpoint for HttpSpeechEndpoint {
    async fn synthesize(
        &self,
        text: &str,
        persona: PersonaId,
    ) -> Result<SynthesisResult, PlaybackError> {
        let response = self
            .http
            .post(self.resolve(TTS_PATH)?)
            .json(&TtsRequestBody::new(text, persona))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), response).await);
        }

        let body: TtsResponse = response.json().await?;
        let error = body.error.clone();
        match body.into_result() {
            Some(SynthesisResult::Synthesized { audio_url }) => Ok(SynthesisResult::Synthesized {
                audio_url: self.resolve(&audio_url)?.to_string(),
            }),
            Some(fallback) => Ok(fallback),
            None => Err(PlaybackError::Unavailable(
                error.unwrap_or_else(|| "TTS synthesis failed".to_string()),
            )),
        }
    }
}

/// Error for a non-2xx answer, using the body's `error` field when present.
async fn status_error(status: u16, response: reqwest::Response) -> PlaybackError {
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    PlaybackError::Status {
        status,
        message: body["error"]
            .as_str()
            .unwrap_or("TTS synthesis failed")
            .to_string(),
    }
}
