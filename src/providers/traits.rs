use async_trait::async_trait;

use crate::error::ProviderError;

/// A hosted chat-completion model driven with single-turn prompts.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends `prompt` as one user message and returns the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    fn model_name(&self) -> &str;
}
