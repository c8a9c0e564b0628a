//! `chat` command handler: a line-based REPL over `/api/chat`.
//!
//! Lines starting with `/` are session commands; everything else is sent as
//! a turn. Replies are printed as they stream in. Ctrl-C stops the reply
//! in progress without leaving the REPL.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use mentorchat_client::{
    ChatEvent, ChatSession, DEFAULT_CONNECT_TIMEOUT, HttpChatTransport, PlayerOptions,
    SessionConfig, SpeechPlayer, TurnOutcome,
};
use mentorchat_core::{Language, PersonaId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::error::CliError;
use crate::handlers::speech_player;

const HELP: &str = "\
Commands:
  /persona <hitesh|piyush>            switch mentor
  /language <hindi|hinglish|english>  switch reply language
  /clear                              start over
  /quit                               leave";

/// `chat` flags.
pub struct ChatArgs {
    pub persona: PersonaId,
    pub language: Language,
    pub speak: bool,
    pub fallback_enabled: bool,
}

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    Persona(PersonaId),
    Language(Language),
    Clear,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(n, a)| (n, a.trim()));
    match name {
        "persona" => arg
            .parse()
            .map_or_else(|e: mentorchat_core::UnknownPersona| Input::Invalid(e.to_string()), Input::Persona),
        "language" => arg
            .parse()
            .map_or_else(|e: mentorchat_core::UnknownLanguage| Input::Invalid(e.to_string()), Input::Language),
        "clear" => Input::Clear,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Invalid(format!("Unknown command /{other}. Type /help.")),
    }
}

pub async fn execute(server: &str, args: ChatArgs) -> Result<()> {
    let transport = HttpChatTransport::new(server, DEFAULT_CONNECT_TIMEOUT)
        .map_err(CliError::from)?;
    let (session, events) = ChatSession::new(
        Arc::new(transport),
        SessionConfig {
            persona: args.persona,
            language: args.language,
            ..SessionConfig::default()
        },
    );
    tokio::spawn(print_replies(events));

    let player = if args.speak {
        let options = PlayerOptions {
            fallback_enabled: args.fallback_enabled,
            auto_play: true,
        };
        Some(speech_player(server, options).await?.0)
    } else {
        None
    };

    println!(
        "Chatting with {} in {}. Type /help for commands.",
        session.persona(),
        session.language()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(session.persona())?;
        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Invalid(message) => println!("{message}"),
            Input::Clear => {
                session.clear();
                println!("Conversation cleared.");
            }
            Input::Persona(persona) => {
                session.set_persona(persona);
                println!("Now chatting with {persona}.");
            }
            Input::Language(language) => {
                session.set_language(language);
                println!("Replies will be in {language}.");
            }
            Input::Message(text) => {
                match run_turn(&session, text).await? {
                    TurnOutcome::Completed(message) => {
                        if let Some(player) = &player {
                            let persona = message.persona.unwrap_or_else(|| session.persona());
                            speak_reply(player, &message.content, persona).await;
                        }
                    }
                    TurnOutcome::Failed { message, .. } => println!("{}", message.content),
                    TurnOutcome::Cancelled => {}
                }
            }
        }
    }

    if let Some(player) = &player {
        player.stop();
    }
    Ok(())
}

/// Send one turn; Ctrl-C cancels it and waits for the session to settle.
async fn run_turn(session: &ChatSession, text: String) -> Result<TurnOutcome> {
    let turn = session.send_turn(text);
    tokio::pin!(turn);

    let outcome = tokio::select! {
        outcome = &mut turn => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.cancel();
            turn.await
        }
    };
    Ok(outcome?)
}

async fn speak_reply(player: &SpeechPlayer, text: &str, persona: PersonaId) {
    if let Err(e) = player.play(text, persona).await {
        tracing::warn!(error = %e, "Could not speak reply");
        eprintln!("(speech unavailable: {e})");
    }
}

/// Print streamed text as it grows. `Partial` carries the whole buffer, so
/// only the unseen suffix is written.
async fn print_replies(mut events: mpsc::UnboundedReceiver<ChatEvent>) {
    let mut printed = 0;
    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::Started => printed = 0,
            ChatEvent::Partial(text) => {
                if let Some(fresh) = text.get(printed..) {
                    print!("{fresh}");
                    let _ = std::io::stdout().flush();
                }
                printed = text.len();
            }
            ChatEvent::Finalized(_) => println!(),
            ChatEvent::Failed(_) if printed > 0 => println!(),
            ChatEvent::Failed(_) => {}
            ChatEvent::Cancelled => println!("\n(stopped)"),
        }
    }
}

fn prompt(persona: PersonaId) -> Result<()> {
    print!("you → {persona}> ");
    std::io::stdout().flush().context("Failed to flush stdout")
}
