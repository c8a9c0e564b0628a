//! Core domain for mentorchat.
//!
//! Holds the persona registry, chat and speech domain types, the speech
//! provider port, and the transport-agnostic services built on top of them
//! (speech cache keying, speech synthesis, event-stream decoding), plus the
//! JSON wire contracts shared by server and client. Adapter
//! crates (`mentorchat-axum`, `mentorchat-elevenlabs`, `mentorchat-client`)
//! depend on this crate; it depends on none of them.

pub mod contracts;
pub mod domain;
pub mod ports;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    ChatRequest, HistoryMessage, Language, Message, MessageRole, PersonaConfig, PersonaId,
    PersonaRegistry, SynthesisRequest, SynthesisResult, SynthesisSettings, UnknownLanguage,
    UnknownPersona, VoiceConfig, VoiceIds,
};
pub use ports::{AudioStream, ProviderError, ProviderRequest, SpeechProviderPort};
pub use services::{
    MAX_TEXT_CHARS, SpeechCache, SpeechSynthesisService, SynthesisConfig, SynthesisError,
    TtsStatus,
};
pub use utils::sse::{SseDecoder, SseFrame};
