//! Persona domain types and the static persona registry.
//!
//! Persona ids and language registers are closed enumerations. Anything
//! outside them is rejected when parsed at a boundary; nothing inside the
//! core ever substitutes a default persona.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::speech::VoiceConfig;

/// Voice id used when no persona-specific voice is configured.
pub const DEFAULT_VOICE_ID: &str = "default_voice_id";

/// The AI personas a user can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaId {
    Hitesh,
    Piyush,
}

impl PersonaId {
    /// Every known persona, in display order.
    pub const ALL: [Self; 2] = [Self::Hitesh, Self::Piyush];

    /// Wire representation of the persona id.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hitesh => "hitesh",
            Self::Piyush => "piyush",
        }
    }

    /// Comma-separated list of supported persona ids.
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known persona.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid persona. Supported personas: {}", PersonaId::supported_list())]
pub struct UnknownPersona(pub String);

impl FromStr for PersonaId {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hitesh" => Ok(Self::Hitesh),
            "piyush" => Ok(Self::Piyush),
            other => Err(UnknownPersona(other.to_string())),
        }
    }
}

/// Language register the persona should answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hindi,
    #[default]
    Hinglish,
    English,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::Hindi, Self::Hinglish, Self::English];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hindi => "hindi",
            Self::Hinglish => "hinglish",
            Self::English => "english",
        }
    }

    /// Instruction appended to the persona prompt.
    #[must_use]
    pub const fn instruction(&self) -> &'static str {
        match self {
            Self::Hindi => {
                "Respond primarily in Hindi with technical terms in English when necessary."
            }
            Self::Hinglish => {
                "Use a natural mix of Hindi and English (Hinglish) as you normally would."
            }
            Self::English => {
                "Respond primarily in English but maintain your characteristic style and occasional Hindi phrases."
            }
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known language register.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid language '{0}'. Supported languages: hindi, hinglish, english")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hindi" => Ok(Self::Hindi),
            "hinglish" => Ok(Self::Hinglish),
            "english" => Ok(Self::English),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Voice synthesis tuning passed to the speech provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

/// Static configuration for one persona.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaConfig {
    pub id: PersonaId,
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Provider voice id (cloned voice) for premium synthesis.
    pub voice_id: String,
    pub synthesis_settings: SynthesisSettings,
    /// Parameters for local speech synthesis when the provider is unavailable.
    pub fallback_voice: VoiceConfig,
    /// Substrings matched against local voice names when picking a fallback voice.
    pub local_voice_hints: &'static [&'static str],
    pub prompt_template: &'static str,
}

/// Per-persona provider voice ids, usually read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceIds {
    pub hitesh: String,
    pub piyush: String,
}

impl Default for VoiceIds {
    fn default() -> Self {
        Self {
            hitesh: DEFAULT_VOICE_ID.to_string(),
            piyush: DEFAULT_VOICE_ID.to_string(),
        }
    }
}

/// Immutable mapping from persona id to configuration.
///
/// Built once at process start and shared behind an `Arc`. Lookups are
/// total because [`PersonaId`] is closed.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    hitesh: PersonaConfig,
    piyush: PersonaConfig,
}

impl PersonaRegistry {
    #[must_use]
    pub fn new(voice_ids: VoiceIds) -> Self {
        Self {
            hitesh: PersonaConfig {
                id: PersonaId::Hitesh,
                name: "Hitesh Choudhary",
                display_name: "Hitesh",
                description: "Friendly, practical tech mentor who loves chai and coding",
                voice_id: voice_ids.hitesh,
                synthesis_settings: SynthesisSettings {
                    stability: 0.5,
                    similarity_boost: 0.75,
                    style: 0.0,
                    use_speaker_boost: true,
                },
                fallback_voice: VoiceConfig {
                    rate: 0.9,
                    pitch: 0.8,
                    volume: 1.0,
                    voice_index: 0,
                },
                local_voice_hints: &["hitesh", "rishi"],
                prompt_template: include_str!("../../prompts/hitesh.txt"),
            },
            piyush: PersonaConfig {
                id: PersonaId::Piyush,
                name: "Piyush Garg",
                display_name: "Piyush",
                description: "Precise, calm educator with structured teaching approach",
                voice_id: voice_ids.piyush,
                synthesis_settings: SynthesisSettings {
                    stability: 0.6,
                    similarity_boost: 0.8,
                    style: 0.0,
                    use_speaker_boost: true,
                },
                fallback_voice: VoiceConfig {
                    rate: 0.95,
                    pitch: 1.1,
                    volume: 1.0,
                    voice_index: 1,
                },
                local_voice_hints: &["piyush", "ravi"],
                prompt_template: include_str!("../../prompts/piyush.txt"),
            },
        }
    }

    #[must_use]
    pub const fn get(&self, id: PersonaId) -> &PersonaConfig {
        match id {
            PersonaId::Hitesh => &self.hitesh,
            PersonaId::Piyush => &self.piyush,
        }
    }

    /// Persona ids in display order.
    pub fn ids(&self) -> impl Iterator<Item = PersonaId> {
        PersonaId::ALL.into_iter()
    }

    /// Full system prompt for a persona speaking in the given register.
    #[must_use]
    pub fn system_prompt(&self, id: PersonaId, language: Language) -> String {
        format!(
            "{}\n\nLanguage preference: {}",
            self.get(id).prompt_template.trim_end(),
            language.instruction()
        )
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new(VoiceIds::default())
    }
}
