//! Client error types.

use std::time::Duration;

use thiserror::Error;

/// Failures while opening or reading a chat stream.
///
/// The `Display` text is what the user sees, both in the error banner and
/// inside the inline apology message.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to reach chat server: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx answer; `message` is the server's `error` field when present.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Stream interrupted: {0}")]
    Stream(String),

    /// The server reported a failure inside the stream.
    #[error("{0}")]
    Server(String),

    #[error("No response from chat server for {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Misuse of a [`ChatSession`](crate::ChatSession).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("A chat turn is already in progress")]
    TurnInFlight,
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Failed to reach speech service: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    /// The service answered without audio and fallback was unavailable.
    #[error("{0}")]
    Unavailable(String),

    #[error("Invalid audio URL: {0}")]
    InvalidUrl(String),

    #[error("Audio playback failed: {0}")]
    Audio(String),

    #[error("Speech synthesis failed: {0}")]
    LocalSpeech(String),
}
