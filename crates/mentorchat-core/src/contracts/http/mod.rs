//! HTTP API routes and bodies.

pub mod chat;
pub mod tts;

pub use chat::{CHAT_PATH, ChatFrame, DONE_EVENT};
pub use tts::{TTS_PATH, TtsRequestBody, TtsResponse, TtsStatusResponse};
