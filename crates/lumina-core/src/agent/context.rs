//! Context builder for the language-model fallback.
//!
//! Assembles the store identity, the rolling conversation context and the
//! serialized knowledge base into the message list sent to the provider.

use crate::agent::state::ConversationState;
use crate::knowledge::KnowledgeBase;
use crate::provider::types::ChatMessage;

/// Builds the prompt for a single fallback call.
pub struct ContextBuilder<'a> {
    store_name: &'a str,
    kb: &'a KnowledgeBase,
    state: &'a ConversationState,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(store_name: &'a str, kb: &'a KnowledgeBase, state: &'a ConversationState) -> Self {
        Self {
            store_name,
            kb,
            state,
        }
    }

    /// Identity, rolling context and answering rules.
    pub fn build_system_prompt(&self) -> String {
        let topic = self
            .state
            .last_topic
            .as_deref()
            .unwrap_or("nenhum assunto ainda");
        let product = self
            .state
            .last_product
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok())
            .unwrap_or_else(|| "nenhum produto ainda".to_string());

        format!(
            r#"Você é o chatbot oficial da loja {}.

CONTEXTO:
- Último assunto detectado: {}
- Último produto mostrado: {}

REGRAS:
- Responda APENAS o que o usuário pediu.
- Entenda continuidade de conversas.
- Use dados do banco.
- Se não houver informação, responda: "Não encontrei isso no momento.""#,
            self.store_name, topic, product
        )
    }

    /// The whole knowledge base as a grounding message.
    pub fn build_knowledge_message(&self) -> String {
        format!("Banco de dados: {}", self.kb.to_prompt_json())
    }

    /// Complete message list: two system messages, then the raw user message.
    pub fn build_messages(&self, current_message: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(&self.build_system_prompt()),
            ChatMessage::system(&self.build_knowledge_message()),
            ChatMessage::user(current_message),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Product;

    #[test]
    fn test_prompt_without_context() {
        let kb = KnowledgeBase::default();
        let state = ConversationState::new();
        let prompt = ContextBuilder::new("Lumina Style", &kb, &state).build_system_prompt();

        assert!(prompt.starts_with("Você é o chatbot oficial da loja Lumina Style."));
        assert!(prompt.contains("- Último assunto detectado: nenhum assunto ainda"));
        assert!(prompt.contains("- Último produto mostrado: nenhum produto ainda"));
    }

    #[test]
    fn test_prompt_with_context() {
        let kb = KnowledgeBase::default();
        let state = ConversationState {
            last_topic: Some("frete".into()),
            last_product: Some(Product {
                name: "Boné Classic Street".into(),
                price: 59.9,
                emoji: "🧢".into(),
                description: "Aba curva".into(),
                categories: vec!["boné".into()],
                colors: None,
            }),
            postal_code: None,
        };
        let prompt = ContextBuilder::new("Lumina Style", &kb, &state).build_system_prompt();

        assert!(prompt.contains("- Último assunto detectado: frete"));
        assert!(prompt.contains(r#""nome":"Boné Classic Street""#));
    }

    #[test]
    fn test_message_layout() {
        let kb = KnowledgeBase::from_json(r#"{"pix": "10% off"}"#).unwrap();
        let state = ConversationState::new();
        let messages = ContextBuilder::new("Lumina Style", &kb, &state).build_messages("oi");

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1], ChatMessage::system(r#"Banco de dados: {"pix":"10% off"}"#));
        assert_eq!(messages[2], ChatMessage::user("oi"));
    }
}
