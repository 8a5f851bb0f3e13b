//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the path given with `-f/--config`), then applies env overrides:
//! `RETAIL_QA_LOG_LEVEL`, `RETAIL_QA_BIND`, `RETAIL_QA_CATALOG` and
//! `CEREBRAS_MODEL`. The provider API key only ever comes from
//! `OPENROUTER_API_KEY`.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the router is served on.
    pub bind: String,
}

/// Product catalog location.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// JSON file holding `{"products": [...]}` (already expanded, no `~`).
    pub path: PathBuf,
}

/// OpenRouter / OpenAI-compatible provider configuration.
/// Populated from `[llm.openrouter]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    pub temperature: f32,
    /// Response length cap sent as `max_tokens`.
    pub max_tokens: u32,
    /// Per-request HTTP timeout. `None` keeps the client default.
    pub timeout_seconds: Option<u64>,
}

/// LLM gateway configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"openrouter"` or `"dummy"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub openrouter: OpenRouterConfig,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub llm: LlmConfig,
    /// API key from `OPENROUTER_API_KEY`. Never sourced from TOML.
    /// An empty variable counts as unset.
    pub llm_api_key: Option<String>,
}

/// Values read from the environment that take precedence over the TOML.
/// Tests build this directly instead of mutating process env.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_level: Option<String>,
    pub bind: Option<String>,
    pub catalog_path: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("RETAIL_QA_LOG_LEVEL").ok(),
            bind: env::var("RETAIL_QA_BIND").ok(),
            catalog_path: env::var("RETAIL_QA_CATALOG").ok(),
            model: env::var("CEREBRAS_MODEL").ok(),
            api_key: env::var("OPENROUTER_API_KEY").ok(),
        }
    }
}

// ── Raw TOML shape ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    service: RawService,
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    catalog: RawCatalog,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_bind")]
    bind: String,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default = "default_catalog_path")]
    path: String,
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openrouter: RawOpenRouter,
}

#[derive(Deserialize)]
struct RawOpenRouter {
    #[serde(default = "default_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl Default for RawService {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

impl Default for RawServer {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for RawCatalog {
    fn default() -> Self {
        Self { path: default_catalog_path() }
    }
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openrouter: RawOpenRouter::default() }
    }
}

impl Default for RawOpenRouter {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: None,
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_bind() -> String { "0.0.0.0:5000".to_string() }
fn default_catalog_path() -> String { "data/products.json".to_string() }
fn default_llm_provider() -> String { "openrouter".to_string() }
fn default_api_base_url() -> String { "https://openrouter.ai/api/v1/chat/completions".to_string() }
fn default_model() -> String { "cerebras/qwen-3-32b".to_string() }
fn default_temperature() -> f32 { 0.2 }
fn default_max_tokens() -> u32 { 300 }

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load config from the given path, or `config/default.toml`, then apply
/// env-var overrides. A missing default file yields the built-in defaults;
/// a missing explicit path is an error.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();
    match config_path {
        Some(path) => load_from(Some(Path::new(path)), overrides),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_from(Some(default_path), overrides)
            } else {
                load_from(None, overrides)
            }
        }
    }
}

/// Internal loader. Accepts an explicit path (or none, for defaults only)
/// and the override set.
pub fn load_from(path: Option<&Path>, overrides: Overrides) -> Result<Config, AppError> {
    let parsed: RawConfig = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
            toml::from_str(&raw)
                .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
        }
        None => RawConfig::default(),
    };

    let log_level = overrides.log_level.unwrap_or(parsed.service.log_level);
    let bind = overrides.bind.unwrap_or(parsed.server.bind);
    let catalog_path = overrides.catalog_path.unwrap_or(parsed.catalog.path);
    let model = overrides
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(parsed.llm.openrouter.model);

    Ok(Config {
        log_level,
        server: ServerConfig { bind },
        catalog: CatalogConfig { path: expand_home(&catalog_path) },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openrouter: OpenRouterConfig {
                api_base_url: parsed.llm.openrouter.api_base_url,
                model,
                temperature: parsed.llm.openrouter.temperature,
                max_tokens: parsed.llm.openrouter.max_tokens,
                timeout_seconds: parsed.llm.openrouter.timeout_seconds,
            },
        },
        llm_api_key: overrides.api_key.filter(|k| !k.trim().is_empty()),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

impl Config {
    /// Safe `Config` for tests: no API key, no external calls.
    pub fn test_default(catalog_path: &Path) -> Self {
        Self {
            log_level: "info".into(),
            server: ServerConfig { bind: "127.0.0.1:0".into() },
            catalog: CatalogConfig { path: catalog_path.to_path_buf() },
            llm: LlmConfig {
                provider: "openrouter".into(),
                openrouter: OpenRouterConfig {
                    api_base_url: "http://127.0.0.1:9/v1/chat/completions".into(),
                    model: "test-model".into(),
                    temperature: 0.0,
                    max_tokens: 16,
                    timeout_seconds: Some(1),
                },
            },
            llm_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_TOML: &str = r#"
[service]
log_level = "debug"

[server]
bind = "127.0.0.1:8088"

[catalog]
path = "fixtures/catalog.json"

[llm]
default = "dummy"

[llm.openrouter]
api_base_url = "http://localhost:1234/v1/chat/completions"
model = "local-model"
temperature = 0.7
max_tokens = 64
timeout_seconds = 5
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(Some(f.path()), Overrides::default()).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.server.bind, "0.0.0.0:5000");
        assert_eq!(cfg.catalog.path, PathBuf::from("data/products.json"));
        assert_eq!(cfg.llm.provider, "openrouter");
        assert_eq!(cfg.llm.openrouter.model, "cerebras/qwen-3-32b");
        assert_eq!(cfg.llm.openrouter.max_tokens, 300);
        assert!((cfg.llm.openrouter.temperature - 0.2).abs() < f32::EPSILON);
        assert!(cfg.llm.openrouter.timeout_seconds.is_none());
        assert!(cfg.llm_api_key.is_none());
    }

    #[test]
    fn no_file_matches_empty_file() {
        let cfg = load_from(None, Overrides::default()).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:5000");
        assert_eq!(
            cfg.llm.openrouter.api_base_url,
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn parse_full_config() {
        let f = write_toml(FULL_TOML);
        let cfg = load_from(Some(f.path()), Overrides::default()).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.server.bind, "127.0.0.1:8088");
        assert_eq!(cfg.catalog.path, PathBuf::from("fixtures/catalog.json"));
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.llm.openrouter.model, "local-model");
        assert_eq!(cfg.llm.openrouter.max_tokens, 64);
        assert_eq!(cfg.llm.openrouter.timeout_seconds, Some(5));
    }

    #[test]
    fn env_overrides_win() {
        let f = write_toml(FULL_TOML);
        let overrides = Overrides {
            log_level: Some("trace".into()),
            bind: Some("0.0.0.0:9000".into()),
            catalog_path: Some("/srv/products.json".into()),
            model: Some("cerebras/llama-4".into()),
            api_key: Some("sk-test".into()),
        };
        let cfg = load_from(Some(f.path()), overrides).unwrap();
        assert_eq!(cfg.log_level, "trace");
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.catalog.path, PathBuf::from("/srv/products.json"));
        assert_eq!(cfg.llm.openrouter.model, "cerebras/llama-4");
        assert_eq!(cfg.llm_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn blank_api_key_counts_as_unset() {
        let overrides = Overrides { api_key: Some("  ".into()), ..Overrides::default() };
        let cfg = load_from(None, overrides).unwrap();
        assert!(cfg.llm_api_key.is_none());
    }

    #[test]
    fn blank_model_override_is_ignored() {
        let overrides = Overrides { model: Some(String::new()), ..Overrides::default() };
        let cfg = load_from(None, overrides).unwrap();
        assert_eq!(cfg.llm.openrouter.model, "cerebras/qwen-3-32b");
    }

    #[test]
    fn missing_explicit_file_errors() {
        let result = load_from(Some(Path::new("/nonexistent/config.toml")), Overrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn malformed_toml_errors() {
        let f = write_toml("[server\nbind = ");
        let msg = load_from(Some(f.path()), Overrides::default()).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/catalog/products.json");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("catalog/products.json"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("data/products.json"), PathBuf::from("data/products.json"));
    }
}
