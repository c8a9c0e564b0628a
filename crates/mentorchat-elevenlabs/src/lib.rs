//! `ElevenLabs` text-to-speech adapter for mentorchat.
//!
//! Implements [`mentorchat_core::SpeechProviderPort`] by calling
//! `POST /v1/text-to-speech/{voice_id}` and handing back the MP3 body as a
//! byte stream. Caching and fallback are handled by the core synthesis
//! service, not here.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod models;
mod port;
mod url;

// ============================================================================
// Public API
// ============================================================================

pub use client::ElevenLabsClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_OUTPUT_FORMAT, ElevenLabsConfig};
pub use error::{ElevenLabsError, ElevenLabsResult};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio as _;
