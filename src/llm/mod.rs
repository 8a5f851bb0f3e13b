//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities; clone them freely.
//! The `complete` method is `async fn` on the enum so callers need no
//! trait-object machinery.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key configured. Not a fault: callers degrade to the local
    /// fallback answer.
    #[error("no API key configured")]
    MissingApiKey,
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("unexpected provider response: {0}")]
    Response(String),
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// Ask `question` against the serialized product `context` and return
    /// the provider's text reply.
    pub async fn complete(&self, question: &str, context: &str) -> Result<String, ProviderError> {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.complete(question, context).await,
            LlmProvider::Dummy(p) => p.complete(question, context).await,
        }
    }

    /// Short provider label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAiCompatible(_) => "openrouter",
            LlmProvider::Dummy(_) => "dummy",
        }
    }
}
