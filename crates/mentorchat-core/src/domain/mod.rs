//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (HTTP, filesystem, providers).
//!
//! # Structure
//!
//! - `persona` - Persona ids, language registers, and the persona registry
//! - `chat` - Chat messages and the chat request wire shape
//! - `speech` - Synthesis requests/results and local voice parameters

pub mod chat;
pub mod persona;
pub mod speech;

// Re-export persona types at the domain level for convenience
pub use persona::{
    Language, PersonaConfig, PersonaId, PersonaRegistry, SynthesisSettings, UnknownLanguage,
    UnknownPersona, VoiceIds,
};

// Re-export chat types at the domain level for convenience
pub use chat::{ChatRequest, HistoryMessage, Message, MessageRole};

// Re-export speech types at the domain level for convenience
pub use speech::{SynthesisRequest, SynthesisResult, VoiceConfig};
