//! Conversational participants and the factory that builds them from stored
//! agent definitions.

pub mod assistant;
pub mod factory;
pub mod prompt;
