//! Client for the OpenAI-compatible chat completions backend.
//!
//! `/api/chat` forwards each turn here with `stream: true` and relays the
//! deltas to the browser. Only the request side lives in this module; the
//! SSE translation is in [`crate::stream`].

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the chat backend.
#[derive(Clone)]
pub struct ChatUpstreamConfig {
    /// Base URL up to and including the version segment, e.g. `.../v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for ChatUpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatUpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for ChatUpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ChatUpstreamConfig {
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Chat API key not configured")]
    NotConfigured,

    #[error("Failed to reach chat backend: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Chat backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// One message in the upstream request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [UpstreamMessage],
    stream: bool,
}

/// Shared HTTP client for the chat backend.
#[derive(Debug, Clone)]
pub struct ChatUpstream {
    http: reqwest::Client,
    config: ChatUpstreamConfig,
}

impl ChatUpstream {
    pub fn new(config: ChatUpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Open a streaming completion. Resolves once the backend has answered
    /// with a success status; the body is left unread.
    pub async fn open_stream(
        &self,
        messages: &[UpstreamMessage],
    ) -> Result<reqwest::Response, UpstreamError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured)?;

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.config.model,
                messages,
                stream: true,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        Err(UpstreamError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_joins_cleanly() {
        let config = ChatUpstreamConfig::default().with_base_url("http://localhost:8080/v1/");
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_serialization() {
        let messages = vec![
            UpstreamMessage {
                role: "system",
                content: "Be kind".into(),
            },
            UpstreamMessage {
                role: "user",
                content: "Hi".into(),
            },
        ];
        let body = serde_json::to_value(CompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            stream: true,
        })
        .unwrap();
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hi");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let upstream = ChatUpstream::new(ChatUpstreamConfig::default()).unwrap();
        assert!(!upstream.is_configured());
        let err = upstream.open_stream(&[]).await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ChatUpstreamConfig::default().with_api_key("sk-live");
        assert!(!format!("{config:?}").contains("sk-live"));
    }
}
