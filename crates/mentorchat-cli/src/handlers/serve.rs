//! `serve` command handler.

use std::path::PathBuf;

use anyhow::Result;
use mentorchat_axum::{ServerConfig, start_server};

use crate::error::CliError;

pub async fn execute(
    port: Option<u16>,
    public_dir: Option<PathBuf>,
    allow_origins: Vec<String>,
) -> Result<()> {
    let config = server_config(
        ServerConfig::from_env().map_err(|e| CliError::Config(format!("{e:#}")))?,
        port,
        public_dir,
        allow_origins,
    );

    println!();
    println!("  mentorchat server starting...");
    println!();
    println!("  Serving files from: {}", config.public_dir.display());
    println!("  Local:   http://localhost:{}", config.port);
    println!("  Network: http://0.0.0.0:{}", config.port);
    if !config.elevenlabs.has_api_key() {
        println!("  Speech:  ELEVENLABS_API_KEY not set, /api/tts will return 500");
    }
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    start_server(config).await
}

/// Apply command-line flags on top of the environment configuration.
fn server_config(
    mut config: ServerConfig,
    port: Option<u16>,
    public_dir: Option<PathBuf>,
    allow_origins: Vec<String>,
) -> ServerConfig {
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(dir) = public_dir {
        config = config.with_public_dir(dir);
    }
    if !allow_origins.is_empty() {
        config = config.with_allowed_origins(allow_origins);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorchat_axum::CorsConfig;

    #[test]
    fn test_flags_override_environment() {
        let config = server_config(
            ServerConfig::default(),
            Some(8080),
            Some(PathBuf::from("/srv/public")),
            vec!["http://localhost:5173".into()],
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_dir, PathBuf::from("/srv/public"));
        assert!(matches!(config.cors, CorsConfig::AllowOrigins(ref o) if o.len() == 1));
    }

    #[test]
    fn test_no_flags_keep_environment() {
        let config = server_config(ServerConfig::default().with_port(4000), None, None, Vec::new());
        assert_eq!(config.port, 4000);
        assert!(matches!(config.cors, CorsConfig::AllowAll));
    }
}
