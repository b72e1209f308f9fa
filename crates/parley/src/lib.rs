//! Parley - a terminal chat client for hosted LLM providers.
//!
//! Conversations are sent straight to the selected provider's HTTP API and
//! mirrored to a per-user conversation store.

pub mod auth;
pub mod chat;
pub mod config;
pub mod llm;
pub mod store;
