//! Speech synthesis domain types.

use serde::{Deserialize, Serialize};

use super::persona::PersonaId;

/// Parameters for local (on-device) speech synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    /// Speaking rate multiplier (1.0 = normal).
    pub rate: f32,
    /// Pitch multiplier (1.0 = normal).
    pub pitch: f32,
    /// Volume in `0.0..=1.0`.
    pub volume: f32,
    /// Preferred index into the list of available local voices.
    pub voice_index: usize,
}

/// Input to the speech synthesis pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub persona: PersonaId,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, persona: PersonaId) -> Self {
        Self {
            text: text.into(),
            persona,
        }
    }
}

/// Outcome of a synthesis request. Exactly one variant is ever produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisResult {
    /// Audio is available at `audio_url` (fresh synthesis or cache hit).
    Synthesized { audio_url: String },
    /// The provider failed; the caller should synthesize locally.
    Fallback {
        voice_config: VoiceConfig,
        /// What made the provider call fail.
        reason: String,
    },
}

impl SynthesisResult {
    #[must_use]
    pub fn audio_url(&self) -> Option<&str> {
        match self {
            Self::Synthesized { audio_url } => Some(audio_url),
            Self::Fallback { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}
