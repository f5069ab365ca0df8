use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// A signed-in user. The email is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Result of reviewing a sign-in from the external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInOutcome {
    /// No user existed for the email; one was created.
    Created,
    /// A user with this email already existed.
    Existed,
}

impl fmt::Display for SignInOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInOutcome::Created => write!(f, "User Created"),
            SignInOutcome::Existed => write!(f, "User Existed"),
        }
    }
}

/// One step of the account-deletion cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStep {
    Chats,
    Teams,
    Agents,
    User,
}

impl DeletionStep {
    /// Steps in the order they run.
    pub const ORDER: [DeletionStep; 4] = [
        DeletionStep::Chats,
        DeletionStep::Teams,
        DeletionStep::Agents,
        DeletionStep::User,
    ];
}

impl fmt::Display for DeletionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionStep::Chats => write!(f, "chats"),
            DeletionStep::Teams => write!(f, "teams"),
            DeletionStep::Agents => write!(f, "agents"),
            DeletionStep::User => write!(f, "user"),
        }
    }
}

/// Per-step result of deleting an account.
///
/// Steps are committed independently, so a failure part way leaves the
/// earlier steps applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub chats_deleted: u64,
    pub teams_deleted: u64,
    pub agents_deleted: u64,
    pub user_deleted: bool,
    /// Steps that failed, with the underlying error message.
    pub failed: Vec<(DeletionStep, String)>,
}

impl DeletionReport {
    /// True when every step ran without error.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
