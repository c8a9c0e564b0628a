//! Chat streaming route and event frame.

use serde::{Deserialize, Serialize};

/// Streaming chat endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Terminal event of a chat stream.
pub const DONE_EVENT: &str = "data: [DONE]\n\n";

/// JSON payload of one `data:` event on the chat stream.
///
/// Content frames carry a text fragment; a frame with `error` reports an
/// upstream failure after streaming had already started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatFrame {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: None,
            error: Some(message.into()),
        }
    }

    /// Render as a complete `data: ...\n\n` event.
    pub fn to_event(&self) -> String {
        // Serializing two optional strings cannot fail.
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("data: {json}\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_event_format() {
        assert_eq!(
            ChatFrame::content("Hel").to_event(),
            "data: {\"content\":\"Hel\"}\n\n"
        );
        assert_eq!(
            ChatFrame::error("upstream closed").to_event(),
            "data: {\"error\":\"upstream closed\"}\n\n"
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let frame: ChatFrame = serde_json::from_str(r#"{"content":"x","role":"assistant"}"#).unwrap();
        assert_eq!(frame, ChatFrame::content("x"));
    }
}
