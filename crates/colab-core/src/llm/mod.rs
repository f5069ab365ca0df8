//! LLM provider abstractions for Agent Colab.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch, with the
//!   unified per-call timeout
//! - `ScriptedProvider`: deterministic provider for tests, behind the
//!   `test-util` feature outside this crate

pub mod box_provider;
pub mod provider;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;
