//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports and domain logic. They don't know
//! about concrete providers or transports.

mod speech_cache;
mod speech_synthesis;

pub use speech_cache::{AUDIO_URL_PREFIX, KEY_HEX_CHARS, SpeechCache, StoreOutcome, filename_for};
pub use speech_synthesis::{
    DEFAULT_MODEL_ID, MAX_TEXT_CHARS, MISSING_FIELDS, SpeechSynthesisService, SynthesisConfig,
    SynthesisError, TtsStatus, validate_text,
};
