//! Stored chat transcripts.

use tracing::info;

use colab_types::chat::{ChatSummary, ChatTranscript, NewChatTranscript};
use colab_types::error::{ChatError, RepositoryError};

use super::normalize_email;
use crate::repository::chat::ChatRepository;

pub struct ChatService<C: ChatRepository> {
    chats: C,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(chats: C) -> Self {
        Self { chats }
    }

    /// Save a transcript. Saving under an existing name adds a new row.
    pub async fn store(
        &self,
        email: &str,
        chat_name: &str,
        content: &str,
    ) -> Result<ChatTranscript, ChatError> {
        let owner_email = owner(email)?;
        let chat_name = chat_name.trim();
        if chat_name.is_empty() {
            return Err(ChatError::Invalid("chat name cannot be empty".to_string()));
        }

        let chat = self
            .chats
            .create(&NewChatTranscript {
                owner_email,
                chat_name: chat_name.to_string(),
                content: content.to_string(),
            })
            .await
            .map_err(storage)?;
        info!(id = chat.id, chat_name = %chat.chat_name, "Chat stored");
        Ok(chat)
    }

    /// The newest transcript named `chat_name`.
    ///
    /// Without an owner the lookup spans all users.
    pub async fn fetch(
        &self,
        chat_name: &str,
        email: Option<&str>,
    ) -> Result<ChatTranscript, ChatError> {
        let owner_email = email.map(owner).transpose()?;
        let chat_name = chat_name.trim();
        self.chats
            .find_by_name(chat_name, owner_email.as_deref())
            .await
            .map_err(storage)?
            .ok_or_else(|| ChatError::NotFound(chat_name.to_string()))
    }

    pub async fn list_names(&self, email: &str) -> Result<Vec<ChatSummary>, ChatError> {
        let owner_email = owner(email)?;
        self.chats.list_names(&owner_email).await.map_err(storage)
    }

    /// Delete every transcript the owner saved under `chat_name`. Deleting a
    /// name that does not exist is not an error.
    pub async fn delete(&self, email: &str, chat_name: &str) -> Result<u64, ChatError> {
        let owner_email = owner(email)?;
        let deleted = self
            .chats
            .delete_by_name(&owner_email, chat_name.trim())
            .await
            .map_err(storage)?;
        info!(chat_name = %chat_name.trim(), deleted, "Chat deleted");
        Ok(deleted)
    }
}

fn owner(email: &str) -> Result<String, ChatError> {
    normalize_email(email).ok_or_else(|| ChatError::Invalid(format!("invalid email: '{email}'")))
}

fn storage(e: RepositoryError) -> ChatError {
    ChatError::StorageError(e.to_string())
}
