//! Services composing repositories into the operations the API exposes.
//!
//! Each service is generic over the repository traits it needs, so
//! colab-core never depends on colab-infra.

pub mod account;
pub mod agent;
pub mod chat;
pub mod user;

/// Trim `email` and check it looks like an address.
///
/// Only shape is checked: non-empty, one `@` with text on both sides.
/// Identity is asserted by the external sign-in provider.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(email.to_string())
}
