//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;
use mentorchat_core::{Language, PersonaId};

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (API plus static files)
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory served as static files (overrides MENTORCHAT_PUBLIC_DIR)
        #[arg(long)]
        public_dir: Option<PathBuf>,
        /// Restrict CORS to these origins (repeatable); all origins by default
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },

    /// Chat with a persona in the terminal. Ctrl-C stops the current reply
    Chat {
        /// Persona to talk to (hitesh, piyush)
        #[arg(short, long, default_value = "hitesh")]
        persona: PersonaId,
        /// Reply language (hindi, hinglish, english)
        #[arg(short, long, default_value = "hinglish")]
        language: Language,
        /// Read every reply aloud
        #[arg(long)]
        speak: bool,
        /// Never fall back to local speech synthesis
        #[arg(long)]
        no_fallback: bool,
    },

    /// Say a line of text in a persona's voice
    Speak {
        /// Text to speak
        text: String,
        #[arg(short, long, default_value = "hitesh")]
        persona: PersonaId,
        /// Never fall back to local speech synthesis
        #[arg(long)]
        no_fallback: bool,
        /// Generate (and cache) the audio without playing it
        #[arg(long)]
        prepare_only: bool,
    },

    /// Show the speech endpoint's status
    TtsStatus,
}

#[cfg(test)]
mod tests {
    use crate::Cli;
    use crate::commands::Commands;
    use clap::Parser;
    use mentorchat_core::{Language, PersonaId};

    #[test]
    fn test_chat_defaults() {
        let cli = Cli::parse_from(["mentorchat", "chat"]);
        let Some(Commands::Chat {
            persona,
            language,
            speak,
            no_fallback,
        }) = cli.command
        else {
            panic!("expected chat command");
        };
        assert_eq!(persona, PersonaId::Hitesh);
        assert_eq!(language, Language::Hinglish);
        assert!(!speak);
        assert!(!no_fallback);
    }

    #[test]
    fn test_unknown_persona_is_rejected() {
        assert!(Cli::try_parse_from(["mentorchat", "speak", "hi", "--persona", "linus"]).is_err());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from([
            "mentorchat",
            "serve",
            "--port",
            "8080",
            "--allow-origin",
            "http://localhost:5173",
        ]);
        let Some(Commands::Serve {
            port,
            public_dir,
            allow_origins,
        }) = cli.command
        else {
            panic!("expected serve command");
        };
        assert_eq!(port, Some(8080));
        assert!(public_dir.is_none());
        assert_eq!(allow_origins, ["http://localhost:5173"]);
    }
}
