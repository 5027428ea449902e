pub mod groq;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ProviderError;

pub use groq::GroqProvider;
pub use openai::OpenAIProvider;
pub use traits::CompletionProvider;

/// Builds the completion provider selected by `LLM_PROVIDER`.
pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    if config.api_key.is_none() {
        tracing::warn!(
            provider = ?config.kind,
            "no API key configured; model calls will be rejected upstream"
        );
    }

    let provider: Arc<dyn CompletionProvider> = match config.kind {
        ProviderKind::Groq => Arc::new(GroqProvider::new(config)?),
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(config)),
    };
    tracing::info!(model = provider.model_name(), "completion provider ready");
    Ok(provider)
}
