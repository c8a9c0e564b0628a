//! Command handlers.
//!
//! Handlers are thin: parse CLI-specific input, call into the server or
//! client crates, format output for the terminal.

pub mod chat;
pub mod serve;
pub mod speak;
pub mod status;

use std::sync::Arc;

use mentorchat_client::{
    DEFAULT_CONNECT_TIMEOUT, HttpSpeechEndpoint, PlaybackEvent, PlayerOptions, SpeechPlayer,
};
use tokio::sync::mpsc;

use crate::devices::{
    DEFAULT_AUDIO_PLAYER, DEFAULT_SPEECH_PROGRAM, ProcessAudioOutput, ProcessLocalSpeech,
};
use crate::error::CliError;

/// Wire a [`SpeechPlayer`] to `server` and the local audio programs.
///
/// `MENTORCHAT_AUDIO_PLAYER` and `MENTORCHAT_SPEECH_PROGRAM` override the
/// programs used for playback and fallback speech.
pub(crate) async fn speech_player(
    server: &str,
    options: PlayerOptions,
) -> Result<(SpeechPlayer, mpsc::UnboundedReceiver<PlaybackEvent>), CliError> {
    let endpoint = HttpSpeechEndpoint::new(server, DEFAULT_CONNECT_TIMEOUT)?;
    let audio_program = program_from_env("MENTORCHAT_AUDIO_PLAYER", DEFAULT_AUDIO_PLAYER);
    let speech_program = program_from_env("MENTORCHAT_SPEECH_PROGRAM", DEFAULT_SPEECH_PROGRAM);

    let audio = ProcessAudioOutput::new(audio_program, DEFAULT_CONNECT_TIMEOUT)?;
    let local = ProcessLocalSpeech::detect(speech_program).await;

    Ok(SpeechPlayer::new(
        Arc::new(endpoint),
        Arc::new(audio),
        Arc::new(local),
        options,
    ))
}

fn program_from_env(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Wait until the current utterance ends. Returns the playback error, if any.
pub(crate) async fn wait_for_playback(
    events: &mut mpsc::UnboundedReceiver<PlaybackEvent>,
) -> Option<String> {
    while let Some(event) = events.recv().await {
        match event {
            PlaybackEvent::Finished => return None,
            PlaybackEvent::Error(message) => return Some(message),
            PlaybackEvent::StateChanged(_) | PlaybackEvent::Started(_) => {}
        }
    }
    None
}
