//! CLI-specific error types and exit codes.

use mentorchat_client::{PlaybackError, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The mentorchat server could not be reached or refused the request.
    #[error("Server error: {0}")]
    Server(String),

    /// An external audio or speech program failed.
    #[error("Process error: {0}")]
    Process(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit code following sysexits.h where a category fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,  // EX_CONFIG
            Self::Server(_) => 69,  // EX_UNAVAILABLE
            Self::Process(_) => 71, // EX_OSERR
            Self::Io(_) => 74,      // EX_IOERR
        }
    }
}

impl From<TransportError> for CliError {
    fn from(err: TransportError) -> Self {
        Self::Server(err.to_string())
    }
}

impl From<PlaybackError> for CliError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Audio(_) | PlaybackError::LocalSpeech(_) => {
                Self::Process(err.to_string())
            }
            PlaybackError::InvalidUrl(_) => Self::Config(err.to_string()),
            PlaybackError::Request(_)
            | PlaybackError::Status { .. }
            | PlaybackError::Unavailable(_) => Self::Server(err.to_string()),
        }
    }
}

/// Exit code for an error returned from `main`.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_error_mapping() {
        let err: CliError = PlaybackError::Audio("mpg123 exited".into()).into();
        assert_eq!(err.exit_code(), 71);

        let err: CliError = PlaybackError::Status {
            status: 500,
            message: "Speech provider API key not configured".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 69);
        assert_eq!(
            err.to_string(),
            "Server error: Speech provider API key not configured"
        );
    }

    #[test]
    fn test_exit_code_from_anyhow() {
        let err = anyhow::Error::from(CliError::Config("bad url".into()));
        assert_eq!(exit_code(&err), 78);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
