//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory, called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from `OPENROUTER_API_KEY` (never TOML). A missing
/// key is not an error here: the provider is still built and reports
/// [`ProviderError::MissingApiKey`] per request, which routes every question
/// to the fallback matcher.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider)),
        "openrouter" | "openai" | "openai-compatible" => {
            let p = openai_compatible::OpenAiCompatibleProvider::new(&config.openrouter, api_key)?;
            Ok(LlmProvider::OpenAiCompatible(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::Path;

    fn llm_config(provider: &str) -> LlmConfig {
        let mut llm = Config::test_default(Path::new("unused.json")).llm;
        llm.provider = provider.to_string();
        llm
    }

    #[test]
    fn builds_known_providers() {
        assert_eq!(build(&llm_config("dummy"), None).unwrap().name(), "dummy");
        assert_eq!(build(&llm_config("openrouter"), None).unwrap().name(), "openrouter");
        assert_eq!(
            build(&llm_config("openai-compatible"), Some("k".into())).unwrap().name(),
            "openrouter"
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = build(&llm_config("llamafile"), None).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(ref p) if p == "llamafile"));
    }
}
