//! Infrastructure layer for Agent Colab.
//!
//! Contains implementations of the ports defined in `colab-core`: SQLite
//! repositories, the OpenAI-compatible LLM provider, and the configuration
//! loader.

pub mod config;
pub mod llm;
pub mod sqlite;
