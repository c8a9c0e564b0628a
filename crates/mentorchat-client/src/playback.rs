//! Speech playback controller.
//!
//! [`SpeechPlayer`] asks the speech endpoint for audio and plays it, or
//! speaks the text with an on-device voice when the endpoint answers with a
//! fallback. Only one utterance is ever audible: starting a new one stops
//! the previous one first.
//!
//! Every `play`/`stop` call starts a new *generation*. Completion callbacks
//! carry the generation they were issued for, so a late callback from
//! superseded audio cannot move the state of the current one. Outputs are
//! started one at a time; a start that resolves after its generation was
//! superseded is silenced again right away.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use mentorchat_core::{PersonaId, PersonaRegistry, SynthesisResult, VoiceConfig};
use tokio::sync::{Mutex as AsyncMutex, mpsc};

use crate::error::PlaybackError;
use crate::voice_select::select_voice;

/// Invoked once when playback ends, with `Err` when it ended on an error.
pub type DoneCallback = Box<dyn FnOnce(Result<(), String>) + Send + 'static>;

/// Source of synthesized speech, normally `POST /api/tts`.
#[async_trait]
pub trait SpeechEndpoint: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        persona: PersonaId,
    ) -> Result<SynthesisResult, PlaybackError>;
}

/// Plays audio files by URL.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Start playing `url`. Resolves once playback has actually started;
    /// `on_done` fires when it ends.
    async fn play(&self, url: &str, on_done: DoneCallback) -> Result<(), PlaybackError>;

    /// Stop playback and rewind. A no-op when nothing is playing.
    fn pause(&self);
}

/// An installed on-device voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVoice {
    pub name: String,
    /// BCP 47 tag such as `en-IN`.
    pub lang: String,
}

/// Text plus the parameters to speak it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// `None` uses the system default voice.
    pub voice: Option<LocalVoice>,
}

/// On-device text-to-speech.
#[async_trait]
pub trait LocalSpeech: Send + Sync {
    fn voices(&self) -> Vec<LocalVoice>;

    /// Start speaking. Resolves once speech has started; `on_done` fires
    /// when it ends.
    async fn speak(&self, utterance: Utterance, on_done: DoneCallback)
    -> Result<(), PlaybackError>;

    /// Stop any ongoing speech. A no-op when silent.
    fn cancel(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Waiting for the endpoint or for audio to start.
    Loading,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSource {
    Synthesized { audio_url: String },
    Local { voice: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    StateChanged(PlaybackState),
    Started(PlaybackSource),
    Finished,
    Error(String),
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerOptions {
    /// Speak locally when the endpoint answers with a fallback.
    pub fallback_enabled: bool,
    /// When `false`, `play` only prepares (records the audio URL) and
    /// returns to `Idle` without making a sound.
    pub auto_play: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            auto_play: true,
        }
    }
}

#[derive(Debug, Default)]
struct PlayerState {
    state: PlaybackState,
    last_audio_url: Option<String>,
    error: Option<String>,
}

/// State shared with completion callbacks.
struct Shared {
    generation: AtomicU64,
    state: Mutex<PlayerState>,
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.event_tx.send(event);
    }

    fn set_state(&self, state: PlaybackState) {
        let changed = {
            let mut st = self.lock();
            let changed = st.state != state;
            st.state = state;
            changed
        };
        if changed {
            self.emit(PlaybackEvent::StateChanged(state));
        }
    }

    fn fail(&self, message: String) {
        self.lock().error = Some(message.clone());
        self.emit(PlaybackEvent::Error(message));
        self.set_state(PlaybackState::Idle);
    }

    /// Playback of `generation` ended. Retires the generation so a start
    /// acknowledgement that arrives afterwards is ignored too.
    fn complete(&self, generation: u64, result: Result<(), String>) {
        if self
            .generation
            .compare_exchange(generation, generation + 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::trace!(generation, "Ignoring completion of superseded playback");
            return;
        }

        match result {
            Ok(()) => {
                self.emit(PlaybackEvent::Finished);
                self.set_state(PlaybackState::Idle);
            }
            Err(message) => {
                tracing::warn!(error = %message, "Playback ended with an error");
                self.fail(message);
            }
        }
    }
}

/// Plays message text in a persona's voice.
pub struct SpeechPlayer {
    endpoint: Arc<dyn SpeechEndpoint>,
    audio: Arc<dyn AudioOutput>,
    local: Arc<dyn LocalSpeech>,
    personas: PersonaRegistry,
    options: PlayerOptions,
    shared: Arc<Shared>,
    /// Held while an output is starting.
    starting: AsyncMutex<()>,
}

impl SpeechPlayer {
    /// Create an idle player. Returns the player and a receiver for
    /// [`PlaybackEvent`]s.
    #[must_use]
    pub fn new(
        endpoint: Arc<dyn SpeechEndpoint>,
        audio: Arc<dyn AudioOutput>,
        local: Arc<dyn LocalSpeech>,
        options: PlayerOptions,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let player = Self {
            endpoint,
            audio,
            local,
            personas: PersonaRegistry::default(),
            options,
            shared: Arc::new(Shared {
                generation: AtomicU64::new(0),
                state: Mutex::new(PlayerState::default()),
                event_tx,
            }),
            starting: AsyncMutex::new(()),
        };
        (player, event_rx)
    }

    /// Speak `text` as `persona`, stopping whatever is playing first.
    ///
    /// Resolves once playback has started (or, with `auto_play` off, once
    /// the audio is prepared). Errors are also recorded in
    /// [`error`](Self::error) and the player returns to `Idle`.
    pub async fn play(&self, text: &str, persona: PersonaId) -> Result<(), PlaybackError> {
        if self.state() != PlaybackState::Idle {
            self.stop();
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.lock().error = None;
        self.shared.set_state(PlaybackState::Loading);

        let result = match self.endpoint.synthesize(text, persona).await {
            Ok(_) if !self.shared.is_current(generation) => {
                tracing::debug!(generation, "Speech request superseded");
                return Ok(());
            }
            Ok(SynthesisResult::Synthesized { audio_url }) => {
                self.start_audio(generation, audio_url).await
            }
            Ok(SynthesisResult::Fallback {
                voice_config,
                reason,
            }) if self.options.fallback_enabled => {
                tracing::info!(%persona, %reason, "Using local speech fallback");
                self.start_local(generation, text, persona, voice_config)
                    .await
            }
            Ok(SynthesisResult::Fallback { reason, .. }) => {
                Err(PlaybackError::Unavailable(reason))
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            if self.shared.is_current(generation) {
                tracing::warn!(%persona, error = %e, "Speech playback failed");
                self.shared.fail(e.to_string());
            }
        }
        result
    }

    /// Silence both outputs and return to `Idle`.
    pub fn stop(&self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.audio.pause();
        self.local.cancel();
        self.shared.set_state(PlaybackState::Idle);
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.shared.lock().state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state() == PlaybackState::Loading
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// URL of the most recent server-generated audio; cleared by a fallback.
    #[must_use]
    pub fn last_audio_url(&self) -> Option<String> {
        self.shared.lock().last_audio_url.clone()
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.shared.lock().error.clone()
    }

    async fn start_audio(&self, generation: u64, audio_url: String) -> Result<(), PlaybackError> {
        self.shared.lock().last_audio_url = Some(audio_url.clone());
        if !self.options.auto_play {
            self.shared.set_state(PlaybackState::Idle);
            return Ok(());
        }

        let _starting = self.starting.lock().await;
        if !self.shared.is_current(generation) {
            return Ok(());
        }
        self.audio
            .play(&audio_url, self.on_done(generation))
            .await?;
        if !self.shared.is_current(generation) {
            tracing::debug!(generation, "Silencing superseded audio");
            self.audio.pause();
            return Ok(());
        }
        self.mark_started(generation, PlaybackSource::Synthesized { audio_url });
        Ok(())
    }

    async fn start_local(
        &self,
        generation: u64,
        text: &str,
        persona: PersonaId,
        voice_config: VoiceConfig,
    ) -> Result<(), PlaybackError> {
        self.shared.lock().last_audio_url = None;

        let voices = self.local.voices();
        let hints = self.personas.get(persona).local_voice_hints;
        let voice = select_voice(&voices, hints, voice_config.voice_index).cloned();
        let utterance = Utterance {
            text: text.to_string(),
            rate: voice_config.rate,
            pitch: voice_config.pitch,
            volume: voice_config.volume,
            voice,
        };

        if !self.options.auto_play {
            self.shared.set_state(PlaybackState::Idle);
            return Ok(());
        }

        let voice_name = utterance.voice.as_ref().map(|v| v.name.clone());
        let _starting = self.starting.lock().await;
        if !self.shared.is_current(generation) {
            return Ok(());
        }
        self.local.cancel();
        self.local
            .speak(utterance, self.on_done(generation))
            .await?;
        if !self.shared.is_current(generation) {
            tracing::debug!(generation, "Silencing superseded local speech");
            self.local.cancel();
            return Ok(());
        }
        self.mark_started(generation, PlaybackSource::Local { voice: voice_name });
        Ok(())
    }

    fn mark_started(&self, generation: u64, source: PlaybackSource) {
        if !self.shared.is_current(generation) {
            return;
        }
        self.shared.set_state(PlaybackState::Playing);
        self.shared.emit(PlaybackEvent::Started(source));
    }

    fn on_done(&self, generation: u64) -> DoneCallback {
        let shared = Arc::clone(&self.shared);
        Box::new(move |result| shared.complete(generation, result))
    }
}
