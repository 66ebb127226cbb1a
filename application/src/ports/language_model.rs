//! Generative-language collaborator port
//!
//! The language model is an unreliable collaborator: it may be absent
//! entirely (no API key configured), slow, or return malformed text. Every
//! caller holds it as `Option<Arc<dyn LanguageModel>>` and carries a
//! deterministic fallback; its absence is never propagated as an error.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the generative-language collaborator
#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("Language model unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Empty response")]
    EmptyResponse,
}

/// Text generation from a free-form prompt
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate text for the prompt.
    ///
    /// Implementations should return [`LanguageModelError`] rather than
    /// panic; callers degrade to rule-based behavior on any error.
    async fn generate(&self, prompt: &str) -> Result<String, LanguageModelError>;
}
