//! Streaming chat handler.
//!
//! Forwards one conversation turn to the chat backend and relays the reply
//! as an event stream of `{"content": ...}` frames.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use mentorchat_core::{HistoryMessage, Language, PersonaId, PersonaRegistry};
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;
use crate::stream::chat_event_response;
use crate::upstream::UpstreamMessage;

/// `POST /api/chat` body. Persona and language arrive as strings so an
/// unknown value gets a descriptive 400 rather than a generic parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryMessage>,
}

/// `POST /api/chat` - stream a persona's reply.
pub async fn stream_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(body) = body?;

    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| HttpError::BadRequest("Message is required.".to_string()))?;

    let persona: PersonaId = body
        .persona
        .ok_or_else(|| HttpError::BadRequest("Persona is required.".to_string()))?
        .parse()
        .map_err(|e: mentorchat_core::UnknownPersona| HttpError::BadRequest(e.to_string()))?;

    let language = match body.language.as_deref() {
        None | Some("") => Language::default(),
        Some(raw) => raw
            .parse()
            .map_err(|e: mentorchat_core::UnknownLanguage| HttpError::BadRequest(e.to_string()))?,
    };

    tracing::info!(
        %persona,
        %language,
        history = body.conversation_history.len(),
        "Chat turn"
    );

    let messages = build_messages(
        &state.personas,
        persona,
        language,
        &body.conversation_history,
        message,
    );

    let upstream = state.chat.open_stream(&messages).await.map_err(|e| {
        tracing::warn!(error = %e, "Chat backend request failed");
        HttpError::from(e)
    })?;

    Ok(chat_event_response(upstream))
}

/// `[system prompt, ...history, user message]`. History entries with blank
/// content are dropped.
fn build_messages(
    personas: &PersonaRegistry,
    persona: PersonaId,
    language: Language,
    history: &[HistoryMessage],
    message: String,
) -> Vec<UpstreamMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(UpstreamMessage {
        role: "system",
        content: personas.system_prompt(persona, language),
    });
    messages.extend(
        history
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .map(|m| UpstreamMessage {
                role: m.role.as_str(),
                content: m.content.clone(),
            }),
    );
    messages.push(UpstreamMessage {
        role: "user",
        content: message,
    });
    messages
}
