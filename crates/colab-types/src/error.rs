use thiserror::Error;

use crate::llm::LlmError;

/// Errors related to user accounts.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid email: '{0}'")]
    InvalidEmail(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to agent definitions and teams.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid agent definition: {0}")]
    InvalidDefinition(String),

    #[error("invalid team: {0}")]
    InvalidTeam(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to stored chat transcripts.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat '{0}' not found")]
    NotFound(String),

    #[error("invalid chat: {0}")]
    Invalid(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors raised while building or running an agent exchange.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("expected {expected} agent definitions, found {found}")]
    IncompleteTeam { expected: usize, found: usize },

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("agent lookup failed: {0}")]
    Lookup(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors from repository operations (used by trait definitions in colab-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
