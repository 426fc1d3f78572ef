//! Per-conversation context carried from one turn to the next.

use crate::knowledge::Product;

/// What the assistant remembers between turns.
///
/// A fresh value is created for every run; each turn takes the current state
/// and hands back the updated one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    /// Topic key of the last rule that answered.
    pub last_topic: Option<String>,
    /// Last product shown by the catalog lookup.
    pub last_product: Option<Product>,
    /// Last CEP the customer sent.
    pub postal_code: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line human readable summary, used by the `/status` chat command.
    pub fn summary(&self) -> String {
        format!(
            "Assunto: {} | Produto: {} | CEP: {}",
            self.last_topic.as_deref().unwrap_or("-"),
            self.last_product.as_ref().map_or("-", |p| p.name.as_str()),
            self.postal_code.as_deref().unwrap_or("-"),
        )
    }
}
