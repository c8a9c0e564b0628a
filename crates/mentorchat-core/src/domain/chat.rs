//! Chat domain types.
//!
//! These types represent chat messages in the domain model, independent of
//! any transport concerns. Messages are immutable once created; text that is
//! still streaming lives outside of them until the turn is finalized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::persona::{Language, PersonaId};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaId>,
}

impl Message {
    /// A message typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: MessageRole::User,
            timestamp: Utc::now(),
            persona: None,
        }
    }

    /// A message authored by a persona.
    pub fn assistant(content: impl Into<String>, persona: PersonaId) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: MessageRole::Assistant,
            timestamp: Utc::now(),
            persona: Some(persona),
        }
    }
}

/// Minimal prior-turn shape carried in a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: String,
}

impl From<&Message> for HistoryMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub persona: PersonaId,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub conversation_history: Vec<HistoryMessage>,
}
