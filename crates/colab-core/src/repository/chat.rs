//! Chat transcript repository trait definition.

use colab_types::chat::{ChatSummary, ChatTranscript, NewChatTranscript};
use colab_types::error::RepositoryError;

/// Repository trait for stored transcripts.
pub trait ChatRepository: Send + Sync {
    /// Insert a transcript. Never updates an existing row.
    fn create(
        &self,
        chat: &NewChatTranscript,
    ) -> impl std::future::Future<Output = Result<ChatTranscript, RepositoryError>> + Send;

    /// The newest transcript named `chat_name`, optionally restricted to one
    /// owner.
    fn find_by_name(
        &self,
        chat_name: &str,
        owner_email: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Option<ChatTranscript>, RepositoryError>> + Send;

    /// Names and ids of the owner's transcripts, oldest first.
    fn list_names(
        &self,
        owner_email: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSummary>, RepositoryError>> + Send;

    /// Delete the owner's transcripts named `chat_name`. Returns the row count.
    fn delete_by_name(
        &self,
        owner_email: &str,
        chat_name: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn delete_by_owner(
        &self,
        owner_email: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
