//! Shared application state type.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// An Arc-wrapped `AxumContext` holding the persona registry, the speech
/// pipeline and the chat upstream client.
pub type AppState = Arc<AxumContext>;
