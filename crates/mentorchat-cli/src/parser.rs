//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Chat with AI coding mentors from the terminal.
#[derive(Parser)]
#[command(name = "mentorchat")]
#[command(about = "Chat with AI coding mentors, with streamed replies and speech")]
#[command(version)]
pub struct Cli {
    /// Server used by the client commands
    #[arg(
        long = "server",
        global = true,
        env = "MENTORCHAT_SERVER_URL",
        default_value = DEFAULT_SERVER_URL
    )]
    pub server: String,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "mentorchat",
            "--verbose",
            "--server",
            "http://10.0.0.2:3000",
            "tts-status",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.server, "http://10.0.0.2:3000");
        assert!(matches!(cli.command, Some(Commands::TtsStatus)));
    }
}
