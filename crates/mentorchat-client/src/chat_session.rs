//! Streaming chat turn orchestration.
//!
//! A [`ChatSession`] owns the conversation and runs at most one turn at a
//! time. Text that is still streaming is kept apart from the committed
//! messages and only becomes a [`Message`] when the stream ends cleanly.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use mentorchat_core::contracts::http::ChatFrame;
use mentorchat_core::{ChatRequest, HistoryMessage, Language, Message, PersonaId, SseDecoder, SseFrame};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{ChatError, TransportError};
use crate::transport::ChatTransport;

/// Longest gap tolerated between two stream chunks.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub persona: PersonaId,
    pub language: Language,
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persona: PersonaId::Hitesh,
            language: Language::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Progress of the current turn, for the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Started,
    /// The whole text accumulated so far (not just the new fragment).
    Partial(String),
    Finalized(Message),
    /// Human-readable failure; an inline apology has been appended.
    Failed(String),
    Cancelled,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed(Message),
    Cancelled,
    /// `message` is the apology appended to the conversation.
    Failed { error: String, message: Message },
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<Message>,
    streaming: String,
    loading: bool,
    error: Option<String>,
    persona: PersonaId,
    language: Language,
    cancel: Option<CancellationToken>,
}

/// Conversation state plus the in-flight turn.
///
/// All methods take `&self`; share the session behind an `Arc` to cancel
/// from another task while [`send_turn`](Self::send_turn) is pending.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    idle_timeout: Duration,
    state: Mutex<SessionState>,
    event_tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ChatSession {
    /// Create an empty session. Returns the session and a receiver for
    /// [`ChatEvent`]s.
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = Self {
            transport,
            idle_timeout: config.idle_timeout,
            state: Mutex::new(SessionState {
                messages: Vec::new(),
                streaming: String::new(),
                loading: false,
                error: None,
                persona: config.persona,
                language: config.language,
                cancel: None,
            }),
            event_tx,
        };
        (session, event_rx)
    }

    /// Send `content` as the next user message and stream the reply.
    ///
    /// The user message is committed immediately. Returns
    /// [`ChatError::TurnInFlight`] without touching any state when another
    /// turn has not finished yet.
    pub async fn send_turn(&self, content: impl Into<String>) -> Result<TurnOutcome, ChatError> {
        let content = content.into();

        let (request, token) = {
            let mut st = self.lock();
            if st.loading {
                return Err(ChatError::TurnInFlight);
            }

            let request = ChatRequest {
                message: content.clone(),
                persona: st.persona,
                language: st.language,
                conversation_history: st.messages.iter().map(HistoryMessage::from).collect(),
            };

            st.messages.push(Message::user(content));
            st.loading = true;
            st.error = None;
            st.streaming.clear();

            let token = CancellationToken::new();
            st.cancel = Some(token.clone());
            (request, token)
        };
        let mut turn = TurnGuard {
            session: self,
            token: token.clone(),
            finished: false,
        };

        tracing::debug!(
            persona = %request.persona,
            language = %request.language,
            history = request.conversation_history.len(),
            "Starting chat turn"
        );
        self.emit(ChatEvent::Started);

        let result = tokio::select! {
            biased;
            () = token.cancelled() => None,
            result = self.stream_reply(&request) => Some(result),
        };

        let persona = request.persona;
        let (outcome, event) = {
            let mut st = self.lock();
            turn.release(&mut st);

            match result {
                None => (TurnOutcome::Cancelled, ChatEvent::Cancelled),
                Some(Ok(text)) => {
                    let message = Message::assistant(text, persona);
                    st.messages.push(message.clone());
                    (
                        TurnOutcome::Completed(message.clone()),
                        ChatEvent::Finalized(message),
                    )
                }
                Some(Err(e)) => {
                    let error = e.to_string();
                    let message = Message::assistant(
                        format!("Sorry, mujhe samajh nahi aaya – {error}. Please try again!"),
                        persona,
                    );
                    st.error = Some(error.clone());
                    st.messages.push(message.clone());
                    (
                        TurnOutcome::Failed {
                            error: error.clone(),
                            message,
                        },
                        ChatEvent::Failed(error),
                    )
                }
            }
        };

        match &outcome {
            TurnOutcome::Completed(m) => {
                tracing::debug!(chars = m.content.chars().count(), "Chat turn finalized");
            }
            TurnOutcome::Cancelled => tracing::debug!("Chat turn cancelled"),
            TurnOutcome::Failed { error, .. } => tracing::warn!(%error, "Chat turn failed"),
        }
        self.emit(event);
        Ok(outcome)
    }

    /// Abort the in-flight turn, if any. The pending
    /// [`send_turn`](Self::send_turn) resolves with
    /// [`TurnOutcome::Cancelled`] and no message is committed.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().cancel.as_ref() {
            token.cancel();
        }
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    /// Drop the conversation. An in-flight turn is cancelled.
    pub fn clear(&self) {
        let mut st = self.lock();
        if let Some(token) = st.cancel.as_ref() {
            token.cancel();
        }
        st.messages.clear();
        st.error = None;
        st.streaming.clear();
    }

    /// Switch the language register for later turns; clears the error.
    pub fn set_language(&self, language: Language) {
        let mut st = self.lock();
        st.language = language;
        st.error = None;
    }

    /// Switch persona for later turns. The history is kept.
    pub fn set_persona(&self, persona: PersonaId) {
        self.lock().persona = persona;
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Text received so far for the in-flight turn.
    #[must_use]
    pub fn streaming_text(&self) -> String {
        self.lock().streaming.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    #[must_use]
    pub fn persona(&self) -> PersonaId {
        self.lock().persona
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.lock().language
    }

    /// Read the reply stream to the end and return the accumulated text.
    async fn stream_reply(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let mut stream = self.transport.open(request).await?;
        let mut decoder = SseDecoder::new();
        let mut text = String::new();

        loop {
            let next = tokio::time::timeout(self.idle_timeout, stream.next())
                .await
                .map_err(|_| TransportError::Timeout(self.idle_timeout))?;

            match next {
                Some(chunk) => {
                    for frame in decoder.push(&chunk?) {
                        if self.apply(frame, &mut text)? {
                            return Ok(text);
                        }
                    }
                }
                None => {
                    if let Some(frame) = decoder.finish() {
                        self.apply(frame, &mut text)?;
                    }
                    return Ok(text);
                }
            }
        }
    }

    /// Fold one frame into `text`. Returns `true` at the `[DONE]` sentinel.
    fn apply(&self, frame: SseFrame, text: &mut String) -> Result<bool, TransportError> {
        let data = match frame {
            SseFrame::Done => return Ok(true),
            SseFrame::Data(data) => data,
        };

        let Ok(frame) = serde_json::from_str::<ChatFrame>(&data) else {
            tracing::trace!(%data, "Skipping malformed chat frame");
            return Ok(false);
        };
        if let Some(error) = frame.error {
            return Err(TransportError::Server(error));
        }

        match frame.content {
            Some(content) if !content.is_empty() => {
                text.push_str(&content);
                self.lock().streaming.clone_from(text);
                self.emit(ChatEvent::Partial(text.clone()));
            }
            _ => {}
        }
        Ok(false)
    }

    fn end_turn(st: &mut SessionState) {
        st.loading = false;
        st.cancel = None;
        st.streaming.clear();
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Ends the claimed turn as cancelled if `send_turn` is dropped before it
/// finishes, so the session accepts new turns again.
struct TurnGuard<'a> {
    session: &'a ChatSession,
    token: CancellationToken,
    finished: bool,
}

impl TurnGuard<'_> {
    /// Finish the turn normally; `st` is the locked session state.
    fn release(&mut self, st: &mut SessionState) {
        ChatSession::end_turn(st);
        self.finished = true;
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.token.cancel();
        ChatSession::end_turn(&mut self.session.lock());
        tracing::debug!("Chat turn dropped before completion");
        self.session.emit(ChatEvent::Cancelled);
    }
}
