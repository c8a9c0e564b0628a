//! Speech synthesis route and JSON bodies.
//!
//! The wire shape is flat (`success` plus optional fields) for browser
//! clients; both sides convert to and from [`SynthesisResult`] at the edge.

use serde::{Deserialize, Serialize};

use crate::domain::{PersonaId, SynthesisResult, VoiceConfig};
use crate::services::TtsStatus;

/// Speech synthesis endpoint (`GET` for status, `POST` to synthesize).
pub const TTS_PATH: &str = "/api/tts";

pub const MESSAGE_GENERATED: &str = "Speech generated successfully";
pub const MESSAGE_FALLBACK: &str = "Fallback to client-side synthesis";
pub const MESSAGE_READY: &str = "TTS service is ready";

/// `POST /api/tts` body. Fields are optional so a missing field can be
/// reported with the same message as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsRequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
}

impl TtsRequestBody {
    pub fn new(text: impl Into<String>, persona: PersonaId) -> Self {
        Self {
            text: Some(text.into()),
            persona: Some(persona.as_str().to_string()),
        }
    }
}

/// `POST /api/tts` 200 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsResponse {
    pub success: bool,
    /// Always present on the wire; `null` on fallback.
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfig>,
    pub text: String,
    pub persona: PersonaId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TtsResponse {
    pub fn from_result(result: SynthesisResult, text: String, persona: PersonaId) -> Self {
        match result {
            SynthesisResult::Synthesized { audio_url } => Self {
                success: true,
                audio_url: Some(audio_url),
                voice_config: None,
                text,
                persona,
                message: MESSAGE_GENERATED.to_string(),
                error: None,
            },
            SynthesisResult::Fallback {
                voice_config,
                reason,
            } => Self {
                success: false,
                audio_url: None,
                voice_config: Some(voice_config),
                text,
                persona,
                message: MESSAGE_FALLBACK.to_string(),
                error: Some(reason),
            },
        }
    }

    /// Recover the tagged result. `None` when the body carries neither an
    /// audio URL nor a fallback voice.
    pub fn into_result(self) -> Option<SynthesisResult> {
        match (self.success, self.audio_url, self.voice_config) {
            (true, Some(audio_url), _) => Some(SynthesisResult::Synthesized { audio_url }),
            (_, _, Some(voice_config)) => Some(SynthesisResult::Fallback {
                voice_config,
                reason: self.error.unwrap_or(self.message),
            }),
            _ => None,
        }
    }
}

/// `GET /api/tts` 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsStatusResponse {
    pub success: bool,
    pub available_personas: Vec<PersonaId>,
    pub model_id: String,
    pub message: String,
}

impl From<TtsStatus> for TtsStatusResponse {
    fn from(status: TtsStatus) -> Self {
        Self {
            success: true,
            available_personas: status.available_personas,
            model_id: status.model_id,
            message: MESSAGE_READY.to_string(),
        }
    }
}
