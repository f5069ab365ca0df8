//! Shared domain types for Agent Colab.
//!
//! Users, agent definitions, teams, chat transcripts, LLM message shapes,
//! real-time session events and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod team;
pub mod user;
