//! `mentorchat` command-line interface.
//!
//! Runs the web server (`serve`) and doubles as a terminal client for a
//! running server: `chat` streams persona replies, `speak` plays a line of
//! speech and `tts-status` reports what the speech endpoint can do.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary target only.
use dotenvy as _;
use tracing_subscriber as _;

pub mod commands;
pub mod devices;
pub mod error;
pub mod handlers;
pub mod parser;

pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
