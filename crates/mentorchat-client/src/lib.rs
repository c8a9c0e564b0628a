//! Client-side orchestration for mentorchat.
//!
//! Two independent state machines live here:
//!
//! - [`ChatSession`] drives one streamed chat turn at a time against
//!   `POST /api/chat`, publishing partial text as it arrives and committing a
//!   [`Message`](mentorchat_core::Message) once the stream ends.
//! - [`SpeechPlayer`] turns message text into audible speech, preferring the
//!   server-generated audio and falling back to on-device synthesis.
//!
//! ```text
//!   ChatSession:  idle → loading ──(frames)──▶ finalized | failed | cancelled → idle
//!   SpeechPlayer: Idle → Loading → Playing → Idle
//!                          └──────(error)──────▶ Idle
//! ```
//!
//! Both report progress over an unbounded event channel returned by their
//! constructor. Network and device access sits behind the traits in
//! [`transport`] and [`playback`] so front ends can plug in their own.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod chat_session;
mod error;
pub mod playback;
mod speech_endpoint;
pub mod transport;
mod voice_select;

pub use chat_session::{ChatEvent, ChatSession, DEFAULT_IDLE_TIMEOUT, SessionConfig, TurnOutcome};
pub use error::{ChatError, PlaybackError, TransportError};
pub use playback::{
    AudioOutput, DoneCallback, LocalSpeech, LocalVoice, PlaybackEvent, PlaybackSource,
    PlaybackState, PlayerOptions, SpeechEndpoint, SpeechPlayer, Utterance,
};
pub use speech_endpoint::HttpSpeechEndpoint;
pub use transport::{ChatTransport, ChunkStream, DEFAULT_CONNECT_TIMEOUT, HttpChatTransport};
pub use voice_select::select_voice;
