//! Axum web server for mentorchat.
//!
//! Serves `/api/tts` (speech synthesis with local fallback), `/api/chat`
//! (streamed persona replies), `/health`, and the public directory that holds
//! generated audio. [`bootstrap`] is the composition root.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings; these are used by tests/
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stream;
pub mod upstream;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
pub use upstream::{ChatUpstream, ChatUpstreamConfig, UpstreamError};
