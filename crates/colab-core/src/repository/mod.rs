//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (colab-infra) implements. Each method maps to a single statement; there
//! are no multi-statement transactions.

pub mod agent;
pub mod chat;
pub mod team;
pub mod user;
