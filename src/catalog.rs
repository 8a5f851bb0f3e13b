//! Product catalog: a JSON file of `{"products": [...]}` read on every
//! request.
//!
//! There is no cache: [`Catalog::load`] goes back to disk each time, so
//! edits to the file show up on the next request. A missing or corrupt file
//! is logged and served as an empty catalog.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One product record, typed for matching. Every field is optional in the
/// file, and a null or mistyped value reads as the field's default, so one
/// odd record never hides the rest of the catalog. Fields this service does
/// not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productId", default, deserialize_with = "lenient_id")]
    pub product_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub specifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub features: Vec<String>,
    /// `"Q: ... A: ..."` pairs, one per string.
    #[serde(default, deserialize_with = "lenient_strings")]
    pub faqs: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Typed view of a stored record; `None` when the record is not a JSON
    /// object.
    pub fn from_record(record: &Value) -> Option<Self> {
        if !record.is_object() {
            return None;
        }
        Product::deserialize(record).ok()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(id_text(&Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Keeps the string items of an array and drops everything else.
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// A `productId` as text: strings as-is, numbers in their JSON form.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The catalog as stored. Records stay raw so they are served back exactly
/// as written; [`Catalog::products`] gives the typed view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "products", default)]
    pub records: Vec<Value>,
}

impl Catalog {
    /// Read and parse the catalog, surfacing the failure.
    pub async fn read(path: &Path) -> Result<Self, CatalogError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Read the catalog, falling back to an empty one on any failure.
    pub async fn load(path: &Path) -> Self {
        match Self::read(path).await {
            Ok(catalog) => {
                debug!(path = %path.display(), records = catalog.records.len(), "catalog loaded");
                catalog
            }
            Err(e) => {
                error!(error = %e, "error loading products");
                Self::default()
            }
        }
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Typed products in file order. Records that are not objects are
    /// skipped.
    pub fn products(&self) -> Vec<Product> {
        self.records.iter().filter_map(Product::from_record).collect()
    }

    /// First record whose `productId` equals `id` exactly.
    pub fn find(&self, id: &str) -> Option<&Value> {
        self.records.iter().find(|record| has_id(record, id))
    }

    /// Owned variant of [`Catalog::find`].
    pub fn take(self, id: &str) -> Option<Value> {
        self.records.into_iter().find(|record| has_id(record, id))
    }
}

fn has_id(record: &Value, id: &str) -> bool {
    record.get("productId").and_then(id_text).is_some_and(|text| text == id)
}
