//! CLI entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mentorchat_cli::{Cli, Commands, error, handlers};

#[tokio::main]
async fn main() {
    // Load .env before reading any configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(error::exit_code(&e));
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve {
            port,
            public_dir,
            allow_origins,
        } => handlers::serve::execute(port, public_dir, allow_origins).await,
        Commands::Chat {
            persona,
            language,
            speak,
            no_fallback,
        } => {
            let args = handlers::chat::ChatArgs {
                persona,
                language,
                speak,
                fallback_enabled: !no_fallback,
            };
            handlers::chat::execute(&cli.server, args).await
        }
        Commands::Speak {
            text,
            persona,
            no_fallback,
            prepare_only,
        } => handlers::speak::execute(&cli.server, &text, persona, !no_fallback, prepare_only).await,
        Commands::TtsStatus => handlers::status::execute(&cli.server).await,
    }
}
