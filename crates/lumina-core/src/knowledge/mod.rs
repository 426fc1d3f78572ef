//! Static store knowledge base.
//!
//! The knowledge base is a single JSON object loaded once at startup. Topic
//! keys map to canned answers (strings), `<category>_cores` keys map to color
//! lists, and the optional `produtos` key holds the product records used by
//! the catalog lookup. Nothing here is mutated after loading.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Key holding the product list.
const PRODUCTS_KEY: &str = "produtos";

/// Sample knowledge base written by `lumina onboard`.
pub const SAMPLE_KNOWLEDGE_BASE: &str = include_str!("../../data/bd.json");

/// Errors raised while loading the knowledge base.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("failed to read knowledge base {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("knowledge base is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("knowledge base root must be a JSON object")]
    NotAnObject,

    #[error("invalid product record at index {index}: {source}")]
    Product {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A product record from the `produtos` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "preco")]
    pub price: f64,
    pub emoji: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<String>,
    #[serde(rename = "cores", default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
}

/// Read-only view over the store's knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Map<String, Value>,
    products: Vec<Product>,
}

impl KnowledgeBase {
    /// Load the knowledge base from a JSON file.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let content = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let kb = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            topics = kb.entries.len(),
            products = kb.products.len(),
            "Loaded knowledge base"
        );
        Ok(kb)
    }

    /// Parse a knowledge base from a JSON document.
    pub fn from_json(content: &str) -> Result<Self, KnowledgeError> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(entries) => Self::from_map(entries),
            _ => Err(KnowledgeError::NotAnObject),
        }
    }

    fn from_map(entries: Map<String, Value>) -> Result<Self, KnowledgeError> {
        let products = match entries.get(PRODUCTS_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    Product::deserialize(item)
                        .map_err(|source| KnowledgeError::Product { index, source })
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        Ok(Self { entries, products })
    }

    /// Whether a topic key exists at all.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Canned text answer for a topic, if the key holds a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Canned text answer for a topic, or `default` when absent.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or(default).to_string()
    }

    /// Color list stored under `<category>_cores`.
    pub fn category_colors(&self, category: &str) -> Option<Vec<&str>> {
        let colors = self
            .entries
            .get(&format!("{category}_cores"))?
            .as_array()?
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>();
        (!colors.is_empty()).then_some(colors)
    }

    /// All product records, in file order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of top-level topic keys.
    pub fn topic_count(&self) -> usize {
        self.entries.len()
    }

    /// Compact JSON serialization of the whole knowledge base, used as
    /// grounding for the language model. Non-ASCII text is kept as-is.
    pub fn to_prompt_json(&self) -> String {
        Value::Object(self.entries.clone()).to_string()
    }
}
