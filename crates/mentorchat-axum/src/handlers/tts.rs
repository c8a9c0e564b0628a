//! Speech synthesis handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use mentorchat_core::contracts::http::{TtsRequestBody, TtsResponse, TtsStatusResponse};
use mentorchat_core::services::MISSING_FIELDS;
use mentorchat_core::{PersonaId, SynthesisRequest};

use crate::error::HttpError;
use crate::state::AppState;

/// `GET /api/tts` - readiness and available personas.
pub async fn status(State(state): State<AppState>) -> Result<Json<TtsStatusResponse>, HttpError> {
    let status = state.speech.status()?;
    Ok(Json(status.into()))
}

/// `POST /api/tts` - synthesize speech for a persona.
///
/// Provider failures still answer 200 with `success: false` and the
/// persona's local voice parameters, so clients can fall back without
/// treating it as an error.
pub async fn synthesize(
    State(state): State<AppState>,
    body: Result<Json<TtsRequestBody>, JsonRejection>,
) -> Result<Json<TtsResponse>, HttpError> {
    let Json(body) = body?;

    let non_empty = |field: Option<String>| field.filter(|v| !v.is_empty());
    let (Some(text), Some(persona)) = (non_empty(body.text), non_empty(body.persona)) else {
        return Err(HttpError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let persona: PersonaId = persona
        .parse()
        .map_err(|e: mentorchat_core::UnknownPersona| HttpError::BadRequest(e.to_string()))?;

    let result = state
        .speech
        .synthesize(&SynthesisRequest::new(text.clone(), persona))
        .await?;

    Ok(Json(TtsResponse::from_result(result, text, persona)))
}
