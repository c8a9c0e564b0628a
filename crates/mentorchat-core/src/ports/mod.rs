//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP client or server types in any signature
//! - Provider credentials and endpoints stay inside adapter crates
//! - Request types are owned so adapters and mocks need no lifetimes

pub mod speech_provider;

pub use speech_provider::{AudioStream, ProviderError, ProviderRequest, SpeechProviderPort};
