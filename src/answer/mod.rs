//! Question answering: the configured LLM provider first, the local
//! [`fallback`] matcher whenever the provider cannot answer.

pub mod fallback;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::catalog::{Catalog, Product};
use crate::llm::{LlmProvider, ProviderError};

const PREVIEW_CHARS: usize = 100;

/// The products a question is asked against: one product when the caller
/// named it, otherwise the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Context {
    Product(Product),
    Catalog(Vec<Product>),
}

impl Context {
    pub fn products(&self) -> &[Product] {
        match self {
            Context::Product(p) => std::slice::from_ref(p),
            Context::Catalog(products) => products,
        }
    }

    /// Parse a serialized context: an array of products, a catalog object
    /// (`{"products": [...]}`) or a single product object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        if value.is_array() {
            return Ok(Context::Catalog(serde_json::from_value(value)?));
        }
        if !value.is_object() {
            return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "expected a product or a list of products, got {}",
                kind(&value)
            )));
        }
        if value.get("products").is_some() {
            let catalog: Catalog = serde_json::from_value(value)?;
            Ok(Context::Catalog(catalog.products()))
        } else {
            Ok(Context::Product(serde_json::from_value(value)?))
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Primary provider plus the local fallback. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Answerer {
    primary: LlmProvider,
}

impl Answerer {
    pub fn new(primary: LlmProvider) -> Self {
        Self { primary }
    }

    /// Always produces an answer. The provider and the fallback both see the
    /// same serialized context; provider failures are logged and answered
    /// locally.
    pub async fn answer(&self, question: &str, context: &Context) -> String {
        let context_json = match serde_json::to_string(context) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "cannot serialize product context");
                return fallback::answer(question, context.products());
            }
        };
        info!(provider = self.primary.name(), %question, "answering question");
        let result = self.primary.complete(question, &context_json).await;
        or_fallback(result, || fallback::answer_json(question, &context_json))
    }
}

/// Take the provider's answer, or compute the fallback one.
pub fn or_fallback(
    result: Result<String, ProviderError>,
    fallback: impl FnOnce() -> String,
) -> String {
    match result {
        Ok(text) => {
            info!(preview = %preview(&text), "received answer from provider");
            text
        }
        Err(ProviderError::MissingApiKey) => {
            warn!("OPENROUTER_API_KEY not set, using fallback answers");
            fallback()
        }
        Err(e) => {
            error!(error = %e, "provider unavailable, using fallback answer");
            fallback()
        }
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}
