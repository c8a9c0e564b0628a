//! Upstream SSE → `/api/chat` event stream translation.
//!
//! The chat backend streams OpenAI-style chunks
//! (`data: {"choices":[{"delta":{"content":"hi"}}]}`); the browser contract is
//! `data: {"content":"hi"}` frames followed by `data: [DONE]`. This module
//! translates between the two on the fly.

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use mentorchat_core::contracts::http::{ChatFrame, DONE_EVENT};
use mentorchat_core::{SseDecoder, SseFrame};
use tracing::warn;

/// Wrap an upstream streaming response as an `/api/chat` event-stream response.
pub(crate) fn chat_event_response(upstream: reqwest::Response) -> Response {
    let events = translate_completion_stream(upstream.bytes_stream());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(events))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// State threaded through the `unfold` stream.
struct TranslateState<S> {
    stream: S,
    decoder: SseDecoder,
    /// Events decoded but not yet emitted, in order.
    pending: std::collections::VecDeque<String>,
    finished: bool,
}

/// Convert an upstream completion byte stream into `/api/chat` events.
///
/// Every output item is one complete event. A transport error mid-stream is
/// reported as an `error` frame and the stream still terminates with
/// `[DONE]`, so the client never has to distinguish a dropped connection
/// from a clean end.
pub(crate) fn translate_completion_stream<S, E>(
    byte_stream: S,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = TranslateState {
        stream: byte_stream.boxed(),
        decoder: SseDecoder::new(),
        pending: std::collections::VecDeque::new(),
        finished: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((Ok(Bytes::from(event)), st));
            }
            if st.finished {
                return None;
            }

            match st.stream.next().await {
                Some(Ok(chunk)) => {
                    for frame in st.decoder.push(&chunk) {
                        if st.accept(frame) {
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Upstream chat stream error");
                    st.pending.push_back(ChatFrame::error(e.to_string()).to_event());
                    st.finish();
                }
                None => {
                    if let Some(frame) = st.decoder.finish() {
                        st.accept(frame);
                    }
                    st.finish();
                }
            }
        }
    })
}

impl<S> TranslateState<S> {
    /// Queue the output for one upstream frame. Returns `true` once the
    /// upstream has signalled the end of the stream.
    fn accept(&mut self, frame: SseFrame) -> bool {
        if self.finished {
            return true;
        }
        match frame {
            SseFrame::Done => {
                self.finish();
                true
            }
            SseFrame::Data(data) => {
                if let Some(content) = delta_content(&data) {
                    self.pending
                        .push_back(ChatFrame::content(content).to_event());
                }
                false
            }
        }
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.pending.push_back(DONE_EVENT.to_string());
        }
    }
}

/// Extract `choices[0].delta.content` from an upstream chunk. Malformed
/// chunks and empty deltas (role-only, finish markers) yield `None`.
fn delta_content(data: &str) -> Option<String> {
    let chunk: serde_json::Value = serde_json::from_str(data).ok()?;
    let content = chunk["choices"][0]["delta"]["content"].as_str()?;
    (!content.is_empty()).then(|| content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    async fn collect(parts: Vec<Result<&'static str, &'static str>>) -> String {
        let input = stream::iter(
            parts
                .into_iter()
                .map(|p| p.map(|s| Bytes::from_static(s.as_bytes()))),
        );
        let out: Vec<_> = translate_completion_stream(input).collect().await;
        out.into_iter()
            .map(|r| String::from_utf8(r.unwrap().to_vec()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_translates_deltas_and_done() {
        let out = collect(vec![
            Ok("data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n"),
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"choices\":[{\"del"),
            Ok("ta\":{\"content\":\"lo\"}}]}\n\n"),
            Ok("data: [DONE]\n\n"),
        ])
        .await;
        assert_eq!(
            out,
            "data: {\"content\":\"Hel\"}\n\ndata: {\"content\":\"lo\"}\n\ndata: [DONE]\n\n"
        );
    }

    #[tokio::test]
    async fn test_missing_done_still_terminates() {
        let out = collect(vec![Ok(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
        )])
        .await;
        assert!(out.ends_with("data: [DONE]\n\n"));
        assert_eq!(out.matches("[DONE]").count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_chunks_are_skipped() {
        let out = collect(vec![
            Ok(": ping\n\ndata: not json\n\n"),
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: [DONE]\n\n"),
        ])
        .await;
        assert_eq!(out, "data: {\"content\":\"ok\"}\n\ndata: [DONE]\n\n");
    }

    #[tokio::test]
    async fn test_transport_error_becomes_error_frame() {
        let out = collect(vec![
            Ok("data: {\"choices\":[{\"delta\":{\"content\":\"par\"}}]}\n\n"),
            Err("connection reset"),
        ])
        .await;
        assert_eq!(
            out,
            "data: {\"content\":\"par\"}\n\ndata: {\"error\":\"connection reset\"}\n\ndata: [DONE]\n\n"
        );
    }

    #[tokio::test]
    async fn test_frames_after_done_are_dropped() {
        let out = collect(vec![Ok(
            "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        )])
        .await;
        assert_eq!(out, "data: [DONE]\n\n");
    }
}
