//! `speak` command handler.

use anyhow::Result;
use mentorchat_client::PlayerOptions;
use mentorchat_core::PersonaId;

use crate::error::CliError;
use crate::handlers::{speech_player, wait_for_playback};

pub async fn execute(
    server: &str,
    text: &str,
    persona: PersonaId,
    fallback_enabled: bool,
    prepare_only: bool,
) -> Result<()> {
    let options = PlayerOptions {
        fallback_enabled,
        auto_play: !prepare_only,
    };
    let (player, mut events) = speech_player(server, options).await?;

    player.play(text, persona).await.map_err(CliError::from)?;

    if prepare_only {
        match player.last_audio_url() {
            Some(url) => println!("{url}"),
            None => println!("No generated audio; the server asked for local speech."),
        }
        return Ok(());
    }

    tokio::select! {
        error = wait_for_playback(&mut events) => {
            if let Some(error) = error {
                return Err(CliError::Process(error).into());
            }
        }
        _ = tokio::signal::ctrl_c() => player.stop(),
    }
    Ok(())
}
