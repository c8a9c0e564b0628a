//! Wire types for the `ElevenLabs` text-to-speech API.
//!
//! Internal to `mentorchat-elevenlabs`; callers use
//! [`ProviderRequest`](mentorchat_core::ProviderRequest).

use mentorchat_core::{ProviderRequest, SynthesisSettings};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/text-to-speech/{voice_id}`.
#[derive(Debug, Serialize)]
pub struct TextToSpeechBody<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl From<SynthesisSettings> for VoiceSettings {
    fn from(s: SynthesisSettings) -> Self {
        Self {
            stability: s.stability,
            similarity_boost: s.similarity_boost,
            style: s.style,
            use_speaker_boost: s.use_speaker_boost,
        }
    }
}

impl<'a> From<&'a ProviderRequest> for TextToSpeechBody<'a> {
    fn from(req: &'a ProviderRequest) -> Self {
        Self {
            text: &req.text,
            model_id: &req.model_id,
            voice_settings: req.settings.into(),
        }
    }
}

/// Error envelope: `{"detail": {"status": "...", "message": "..."}}` or
/// `{"detail": "..."}` for validation errors.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured { message: String },
    Plain(String),
    Other(serde_json::Value),
}

/// Longest raw body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Pull a human-readable message out of an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            detail: ErrorDetail::Structured { message } | ErrorDetail::Plain(message),
        }) => message,
        Ok(ErrorEnvelope {
            detail: ErrorDetail::Other(value),
        }) => value.to_string(),
        Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorchat_core::PersonaRegistry;

    #[test]
    fn test_body_uses_snake_case_wire_names() {
        let persona = PersonaRegistry::default();
        let hitesh = persona.get(mentorchat_core::PersonaId::Hitesh);
        let request = ProviderRequest {
            voice_id: hitesh.voice_id.clone(),
            text: "Hanji".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            settings: hitesh.synthesis_settings,
        };

        let json = serde_json::to_value(TextToSpeechBody::from(&request)).unwrap();
        assert_eq!(json["text"], "Hanji");
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
        assert_eq!(json["voice_settings"]["stability"], 0.5);
        assert_eq!(json["voice_settings"]["similarity_boost"], 0.75);
        assert_eq!(json["voice_settings"]["style"], 0.0);
        assert_eq!(json["voice_settings"]["use_speaker_boost"], true);
        assert!(json.get("voice_id").is_none());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"detail":{"status":"invalid_api_key","message":"Invalid API key"}}"#),
            "Invalid API key"
        );
        assert_eq!(error_message(r#"{"detail":"Voice not found"}"#), "Voice not found");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(&"x".repeat(2000)).len(), MAX_ERROR_BODY);
    }
}
