//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin: they validate the wire body, call into the shared
//! services, and shape the JSON response.

pub mod chat;
pub mod tts;
