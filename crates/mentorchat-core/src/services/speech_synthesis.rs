//! Speech synthesis service: cache lookup, provider call, persist, fallback.
//!
//! ```text
//!   validate → configured? → cache hit? ──yes──▶ Synthesized{url}
//!                                 │no
//!                                 ▼
//!                 provider stream → concat → store ──ok──▶ Synthesized{url}
//!                                 │err
//!                                 ▼
//!                        Fallback{persona voice config}
//! ```
//!
//! Provider and storage failures never surface as errors from
//! [`SpeechSynthesisService::synthesize`]; they degrade into
//! [`SynthesisResult::Fallback`] and are logged. Only validation and
//! configuration problems are returned as errors.

use std::sync::Arc;

use bytes::BytesMut;
use futures_util::StreamExt;
use thiserror::Error;

use crate::domain::{PersonaConfig, PersonaId, PersonaRegistry, SynthesisRequest, SynthesisResult};
use crate::ports::{ProviderError, ProviderRequest, SpeechProviderPort};

use super::speech_cache::{SpeechCache, StoreOutcome, filename_for};

/// Longest text accepted for synthesis, in characters.
pub const MAX_TEXT_CHARS: usize = 2500;

/// Reported when `text` or `persona` is absent or empty.
pub const MISSING_FIELDS: &str = "Missing required fields: text and persona are required.";

/// Default provider model.
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Errors returned to the caller of the synthesis service.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Input rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// Provider credentials are missing.
    #[error("{0}")]
    Configuration(String),
}

/// Settings for the synthesis service.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub model_id: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
        }
    }
}

/// Readiness information for `GET /api/tts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsStatus {
    pub available_personas: Vec<PersonaId>,
    pub model_id: String,
}

/// Why a fresh synthesis did not produce a cached artifact.
#[derive(Debug, Error)]
enum GenerationFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("could not save audio: {0}")]
    Storage(#[from] std::io::Error),
}

/// Check the text constraints shared by every entry point.
pub fn validate_text(text: &str) -> Result<(), SynthesisError> {
    if text.is_empty() {
        return Err(SynthesisError::Validation(MISSING_FIELDS.to_string()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(SynthesisError::Validation(format!(
            "Text too long. Maximum {MAX_TEXT_CHARS} characters allowed."
        )));
    }
    Ok(())
}

/// Produces playable audio for `(text, persona)` pairs.
pub struct SpeechSynthesisService {
    provider: Arc<dyn SpeechProviderPort>,
    personas: Arc<PersonaRegistry>,
    cache: SpeechCache,
    config: SynthesisConfig,
}

impl SpeechSynthesisService {
    pub fn new(
        provider: Arc<dyn SpeechProviderPort>,
        personas: Arc<PersonaRegistry>,
        cache: SpeechCache,
        config: SynthesisConfig,
    ) -> Self {
        Self {
            provider,
            personas,
            cache,
            config,
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &SpeechCache {
        &self.cache
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn ensure_configured(&self) -> Result<(), SynthesisError> {
        if self.provider.is_configured() {
            Ok(())
        } else {
            Err(SynthesisError::Configuration(
                "Speech provider API key not configured".to_string(),
            ))
        }
    }

    /// Report which personas can be synthesized and with which model.
    pub fn status(&self) -> Result<TtsStatus, SynthesisError> {
        self.ensure_configured()?;
        Ok(TtsStatus {
            available_personas: self.personas.ids().collect(),
            model_id: self.config.model_id.clone(),
        })
    }

    /// Synthesize speech, reusing a cached artifact when one exists.
    ///
    /// At most one provider call is made per distinct `(text, persona)` for
    /// the lifetime of the cache directory.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult, SynthesisError> {
        validate_text(&request.text)?;
        self.ensure_configured()?;

        let persona = self.personas.get(request.persona);
        let filename = filename_for(&request.text, request.persona);

        if self.cache.lookup(&filename).await {
            tracing::info!(persona = %request.persona, %filename, "Using cached audio");
            return Ok(SynthesisResult::Synthesized {
                audio_url: self.cache.url_for(&filename),
            });
        }

        match self.generate(persona, &request.text, &filename).await {
            Ok(audio_url) => Ok(SynthesisResult::Synthesized { audio_url }),
            Err(failure) => {
                tracing::warn!(
                    persona = %request.persona,
                    error = %failure,
                    "Speech generation failed, falling back to local synthesis"
                );
                Ok(SynthesisResult::Fallback {
                    voice_config: persona.fallback_voice,
                    reason: format!("Failed to generate speech: {failure}"),
                })
            }
        }
    }

    async fn generate(
        &self,
        persona: &PersonaConfig,
        text: &str,
        filename: &str,
    ) -> Result<String, GenerationFailure> {
        tracing::info!(
            persona = %persona.id,
            voice_id = %persona.voice_id,
            "Generating speech"
        );

        let mut stream = self
            .provider
            .synthesize(ProviderRequest {
                voice_id: persona.voice_id.clone(),
                text: text.to_string(),
                model_id: self.config.model_id.clone(),
                settings: persona.synthesis_settings,
            })
            .await?;

        let mut audio = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk?);
        }
        if audio.is_empty() {
            return Err(ProviderError::Stream("provider returned no audio".to_string()).into());
        }

        match self.cache.store(filename, &audio).await? {
            StoreOutcome::Written => {
                tracing::info!(%filename, bytes = audio.len(), "Audio saved");
            }
            StoreOutcome::AlreadyPresent => {
                tracing::debug!(%filename, "Audio was stored concurrently, keeping existing file");
            }
        }

        Ok(self.cache.url_for(filename))
    }
}
