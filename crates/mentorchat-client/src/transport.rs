//! Chat transport port and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use mentorchat_core::ChatRequest;
use mentorchat_core::contracts::http::CHAT_PATH;

use crate::error::TransportError;

/// Connect timeout for clients of a mentorchat server.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw body chunks of an event-stream response, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Opens the event stream for one chat turn.
///
/// Implementations resolve once the server has accepted the request; a
/// rejection (non-2xx) is reported here rather than through the stream.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, request: &ChatRequest) -> Result<ChunkStream, TransportError>;
}

/// `POST /api/chat` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    http: reqwest::Client,
    chat_url: String,
}

impl HttpChatTransport {
    /// `base_url` is the server origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            http,
            chat_url: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ChunkStream, TransportError> {
        let response = self.http.post(&self.chat_url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %body, "Chat request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: error_field(&body).unwrap_or_else(|| "Failed to get response".to_string()),
            });
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| TransportError::Stream(e.to_string()))
            .boxed())
    }
}

/// `error` field of a JSON error body.
fn error_field(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
