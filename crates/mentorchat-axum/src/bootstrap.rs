//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter. All concrete implementations are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use mentorchat_core::services::DEFAULT_MODEL_ID;
use mentorchat_core::{
    PersonaRegistry, SpeechCache, SpeechSynthesisService, SynthesisConfig, VoiceIds,
};
use mentorchat_elevenlabs::{ElevenLabsClient, ElevenLabsConfig};

use crate::upstream::{ChatUpstream, ChatUpstreamConfig};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PUBLIC_DIR: &str = "./public";

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Statically served directory; generated audio lives in its
    /// `generated-audio/` subdirectory.
    pub public_dir: PathBuf,
    pub elevenlabs: ElevenLabsConfig,
    pub voice_ids: VoiceIds,
    /// Speech model passed to the provider.
    pub tts_model_id: String,
    pub chat: ChatUpstreamConfig,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            elevenlabs: ElevenLabsConfig::default(),
            voice_ids: VoiceIds::default(),
            tts_model_id: DEFAULT_MODEL_ID.to_string(),
            chat: ChatUpstreamConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PORT` | `3000` |
    /// | `MENTORCHAT_PUBLIC_DIR` | `./public` |
    /// | `ELEVENLABS_API_KEY` | unset (TTS returns 500) |
    /// | `ELEVENLABS_VOICE_ID_HITESH` / `_PIYUSH` | `default_voice_id` |
    /// | `ELEVENLABS_MODEL_ID` | `eleven_multilingual_v2` |
    /// | `ELEVENLABS_BASE_URL` | `https://api.elevenlabs.io` |
    /// | `CHAT_API_BASE_URL` | `https://api.openai.com/v1` |
    /// | `CHAT_API_KEY`, then `OPENAI_API_KEY` | unset (chat returns 500) |
    /// | `CHAT_MODEL` | `gpt-4o-mini` |
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let mut elevenlabs = defaults
            .elevenlabs
            .with_optional_api_key(get("ELEVENLABS_API_KEY"));
        if let Some(url) = get("ELEVENLABS_BASE_URL") {
            elevenlabs = elevenlabs.with_base_url(url);
        }

        let voice_ids = VoiceIds {
            hitesh: get("ELEVENLABS_VOICE_ID_HITESH").unwrap_or(defaults.voice_ids.hitesh),
            piyush: get("ELEVENLABS_VOICE_ID_PIYUSH").unwrap_or(defaults.voice_ids.piyush),
        };

        let chat = ChatUpstreamConfig {
            base_url: get("CHAT_API_BASE_URL").unwrap_or(defaults.chat.base_url),
            api_key: get("CHAT_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            model: get("CHAT_MODEL").unwrap_or(defaults.chat.model),
            connect_timeout: defaults.chat.connect_timeout,
        };

        Ok(Self {
            port,
            public_dir: get("MENTORCHAT_PUBLIC_DIR").map_or(defaults.public_dir, PathBuf::from),
            elevenlabs,
            voice_ids,
            tts_model_id: get("ELEVENLABS_MODEL_ID").unwrap_or(defaults.tts_model_id),
            chat,
            cors: defaults.cors,
        })
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_public_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_dir = path.into();
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context for the Axum adapter.
///
/// Holds every service the handlers need, already wired.
pub struct AxumContext {
    pub personas: Arc<PersonaRegistry>,
    pub speech: Arc<SpeechSynthesisService>,
    pub chat: Arc<ChatUpstream>,
    /// Directory served as the static fallback.
    pub public_dir: PathBuf,
}

/// Wire the persona registry, speech pipeline and chat upstream.
///
/// Missing credentials are not fatal here; the affected endpoints report a
/// configuration error per request.
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let personas = Arc::new(PersonaRegistry::new(config.voice_ids.clone()));

    let provider = Arc::new(
        ElevenLabsClient::new(config.elevenlabs.clone())
            .context("Failed to build ElevenLabs HTTP client")?,
    );
    if !config.elevenlabs.has_api_key() {
        tracing::warn!("ELEVENLABS_API_KEY is not set; /api/tts will report a configuration error");
    }

    let cache = SpeechCache::in_public_dir(&config.public_dir);
    if let Err(e) = tokio::fs::create_dir_all(cache.dir()).await {
        tracing::warn!(dir = %cache.dir().display(), error = %e, "Could not create audio cache directory");
    }

    tracing::info!(
        target: "mentorchat.paths",
        public_dir = %config.public_dir.display(),
        audio_cache = %cache.dir().display(),
        tts_model = %config.tts_model_id,
        chat_model = %config.chat.model,
        "Axum bootstrap resolved configuration"
    );

    let speech = Arc::new(SpeechSynthesisService::new(
        provider,
        Arc::clone(&personas),
        cache,
        SynthesisConfig {
            model_id: config.tts_model_id.clone(),
        },
    ));

    let chat = Arc::new(
        ChatUpstream::new(config.chat.clone()).context("Failed to build chat HTTP client")?,
    );
    if !chat.is_configured() {
        tracing::warn!("CHAT_API_KEY is not set; /api/chat will report a configuration error");
    }

    Ok(AxumContext {
        personas,
        speech,
        chat,
        public_dir: config.public_dir.clone(),
    })
}

/// Start the web server on the configured port and run until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config).await?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("mentorchat web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.public_dir, PathBuf::from("./public"));
        assert!(!config.elevenlabs.has_api_key());
        assert_eq!(config.voice_ids, VoiceIds::default());
        assert_eq!(config.tts_model_id, "eleven_multilingual_v2");
        assert_eq!(config.chat.base_url, "https://api.openai.com/v1");
        assert!(config.chat.api_key.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8081"),
            ("MENTORCHAT_PUBLIC_DIR", "/srv/public"),
            ("ELEVENLABS_API_KEY", "xi-key"),
            ("ELEVENLABS_VOICE_ID_PIYUSH", "voice-p"),
            ("ELEVENLABS_MODEL_ID", "eleven_turbo_v2_5"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("CHAT_MODEL", "llama3"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.public_dir, PathBuf::from("/srv/public"));
        assert!(config.elevenlabs.has_api_key());
        assert_eq!(config.voice_ids.hitesh, "default_voice_id");
        assert_eq!(config.voice_ids.piyush, "voice-p");
        assert_eq!(config.tts_model_id, "eleven_turbo_v2_5");
        assert_eq!(config.chat.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.chat.model, "llama3");
    }

    #[test]
    fn test_chat_key_takes_precedence_and_blank_is_unset() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("CHAT_API_KEY", "sk-chat"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("ELEVENLABS_API_KEY", "  "),
        ]))
        .unwrap();
        assert_eq!(config.chat.api_key.as_deref(), Some("sk-chat"));
        assert!(!config.elevenlabs.has_api_key());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
