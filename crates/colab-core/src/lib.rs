//! Business logic and repository trait definitions for Agent Colab.
//!
//! This crate defines the "ports" (repository traits, `LlmProvider`,
//! `MessageSink`) that the infrastructure and API layers implement, plus the
//! agent orchestration engine and the real-time session registry. It depends
//! only on `colab-types` -- never on `colab-infra` or any database/IO crate.

pub mod agent;
pub mod llm;
pub mod orchestrator;
pub mod repository;
pub mod service;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
