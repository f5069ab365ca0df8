//! A deterministic provider that replays queued replies.
//!
//! Compiled for this crate's tests and, through the `test-util` feature, for
//! the tests of crates above it. Clones share the same queue and request log.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use colab_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, Usage,
};

use super::provider::LlmProvider;

/// One queued reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    /// Reply after sleeping on the tokio clock.
    Delayed(Duration, String),
    /// Fail with `LlmError::Provider`.
    Fail(String),
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<ScriptedReply>,
    fallback: Option<String>,
    requests: Vec<CompletionRequest>,
}

#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
    capabilities: ProviderCapabilities,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            capabilities: ProviderCapabilities {
                named_messages: true,
                max_context_tokens: 128_000,
                max_output_tokens: 4_096,
            },
        }
    }
}

impl ScriptedProvider {
    /// Provider that answers with `replies` in order.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        {
            let mut script = provider.lock();
            script
                .replies
                .extend(replies.into_iter().map(|r| ScriptedReply::Text(r.into())));
        }
        provider
    }

    /// Queue another reply.
    pub fn push(self, reply: ScriptedReply) -> Self {
        self.lock().replies.push_back(reply);
        self
    }

    /// Reply used once the queue is empty. Without one, an empty queue is a
    /// provider error.
    pub fn with_fallback(self, text: impl Into<String>) -> Self {
        self.lock().fallback = Some(text.into());
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panic while holding the lock only happens inside a failing test.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_reply(&self, request: &CompletionRequest) -> Option<ScriptedReply> {
        let mut script = self.lock();
        script.requests.push(request.clone());
        script
            .replies
            .pop_front()
            .or_else(|| script.fallback.clone().map(ScriptedReply::Text))
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let content = match self.next_reply(request) {
            Some(ScriptedReply::Text(text)) => text,
            Some(ScriptedReply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                text
            }
            Some(ScriptedReply::Fail(message)) => return Err(LlmError::Provider { message }),
            None => {
                return Err(LlmError::Provider {
                    message: "scripted provider has no replies left".to_string(),
                });
            }
        };

        Ok(CompletionResponse {
            id: format!("scripted-{}", self.lock().requests.len()),
            content,
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }
}
