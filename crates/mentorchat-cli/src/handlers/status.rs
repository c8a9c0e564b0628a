//! `tts-status` command handler.

use anyhow::Result;
use mentorchat_client::{DEFAULT_CONNECT_TIMEOUT, HttpSpeechEndpoint};

use crate::error::CliError;

pub async fn execute(server: &str) -> Result<()> {
    let endpoint =
        HttpSpeechEndpoint::new(server, DEFAULT_CONNECT_TIMEOUT).map_err(CliError::from)?;
    let status = endpoint.status().await.map_err(CliError::from)?;

    let personas: Vec<_> = status
        .available_personas
        .iter()
        .map(|p| p.as_str())
        .collect();

    println!("{}", status.message);
    println!("  Server:   {server}");
    println!("  Model:    {}", status.model_id);
    println!("  Personas: {}", personas.join(", "));
    Ok(())
}
