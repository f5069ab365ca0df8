//! BoxLlmProvider -- object-safe dynamic dispatch wrapper for LlmProvider.
//!
//! 1. Define an object-safe `LlmProviderDyn` trait with boxed futures
//! 2. Blanket-impl `LlmProviderDyn` for all `T: LlmProvider`
//! 3. `BoxLlmProvider` wraps `Box<dyn LlmProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use colab_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

use super::provider::LlmProvider;

/// Object-safe version of [`LlmProvider`] with boxed futures.
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;
}

impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        LlmProvider::capabilities(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased LLM provider for runtime provider selection.
///
/// Since `LlmProvider` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxLlmProvider` provides equivalent methods that delegate to
/// the inner `LlmProviderDyn` trait object.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.inner.capabilities()
    }

    /// Send a completion request and receive the full response.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }

    /// Like [`complete`](Self::complete), bounded by `limit`.
    ///
    /// Every provider call made by the orchestrator goes through here, so the
    /// HTTP and WebSocket paths share one timeout policy. Expiry maps to
    /// [`LlmError::Timeout`]; the underlying request future is dropped.
    pub async fn complete_with_timeout(
        &self,
        request: &CompletionRequest,
        limit: Duration,
    ) -> Result<CompletionResponse, LlmError> {
        match tokio::time::timeout(limit, self.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                after_secs: limit.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::{ScriptedProvider, ScriptedReply};
    use colab_types::llm::Message;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "test-model".to_string(),
            messages: vec![Message::user("hi")],
            system: None,
            max_tokens: None,
            temperature: Some(0.0),
            stop_sequences: None,
        }
    }

    #[tokio::test]
    async fn test_box_provider_delegates() {
        let provider = BoxLlmProvider::new(ScriptedProvider::new(["hello"]));
        assert_eq!(provider.name(), "scripted");
        let response = provider.complete(&request()).await.unwrap();
        assert_eq!(response.content, "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_with_timeout_expires() {
        let scripted = ScriptedProvider::default().push(ScriptedReply::Delayed(
            Duration::from_secs(300),
            "too late".to_string(),
        ));
        let provider = BoxLlmProvider::new(scripted);

        let err = provider
            .complete_with_timeout(&request(), Duration::from_secs(120))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout { after_secs: 120 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_with_timeout_passes_fast_reply() {
        let scripted = ScriptedProvider::default().push(ScriptedReply::Delayed(
            Duration::from_secs(1),
            "in time".to_string(),
        ));
        let provider = BoxLlmProvider::new(scripted);

        let response = provider
            .complete_with_timeout(&request(), Duration::from_secs(120))
            .await
            .unwrap();
        assert_eq!(response.content, "in time");
    }
}
