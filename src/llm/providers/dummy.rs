//! Dummy LLM provider. Echoes the question back prefixed with `[echo]`.
//! Exercises the full request path without an API key or network.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, question: &str, _context: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {question}"))
    }
}
