//! Shared helpers with no domain dependencies.

pub mod sse;
