//! Application-wide error types.

use thiserror::Error;

/// Startup and process-level failures. Request handling never produces
/// these; see [`crate::http::ApiError`] for the per-request taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("llm error: {0}")]
    Llm(#[from] crate::llm::ProviderError),

    #[error("server error: {0}")]
    Server(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("config error"));
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn server_error_display() {
        let e = AppError::Server("bind failed on 0.0.0.0:5000".into());
        assert!(e.to_string().starts_with("server error"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = crate::llm::ProviderError::UnknownProvider("nope".into()).into();
        assert!(e.to_string().contains("llm error"));
        assert!(e.to_string().contains("nope"));
    }
}
