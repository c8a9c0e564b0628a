//! Transport contracts shared by the server and client adapters.
//!
//! Route constants and the JSON wire shapes of the HTTP API. Keep these
//! serde-only with no framework-specific types to avoid dependency creep.

pub mod http;
