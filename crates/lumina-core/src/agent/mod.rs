//! Turn handling: the core processing engine.
//!
//! For every user message the chatbot:
//! 1. Runs the rule table ([`intent`]) over the normalized message
//! 2. Returns the canned answer when a rule produced one
//! 3. Otherwise builds the fallback context ([`context`]) and asks the LLM
//!
//! Conversation state is never stored here. Callers pass the current
//! [`ConversationState`] in and get the updated one back.

pub mod catalog;
pub mod context;
pub mod intent;
pub mod normalize;
pub mod state;

use anyhow::Context as _;
use tracing::{debug, info};

use crate::knowledge::KnowledgeBase;
use crate::provider::LlmProvider;
use context::ContextBuilder;
pub use state::ConversationState;

/// Configuration for the chatbot.
#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub store_name: String,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Rule-based assistant with a language-model fallback.
pub struct Chatbot {
    kb: KnowledgeBase,
    provider: Box<dyn LlmProvider>,
    config: ChatbotConfig,
}

impl Chatbot {
    pub fn new(kb: KnowledgeBase, provider: Box<dyn LlmProvider>, config: ChatbotConfig) -> Self {
        Self {
            kb,
            provider,
            config,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Answer one user message.
    ///
    /// Provider failures are returned as errors; they are not turned into
    /// chat replies.
    pub async fn reply(
        &self,
        state: ConversationState,
        message: &str,
    ) -> anyhow::Result<(String, ConversationState)> {
        let (answer, state) = intent::detect(&self.kb, state, message);
        if let Some(answer) = answer {
            debug!(topic = state.last_topic.as_deref().unwrap_or("-"), "Answered from rules");
            return Ok((answer, state));
        }

        let answer = self.ask_model(&state, message).await?;
        Ok((answer, state))
    }

    /// Send `message` to the language model with the conversation context.
    pub async fn ask_model(
        &self,
        state: &ConversationState,
        message: &str,
    ) -> anyhow::Result<String> {
        let ctx = ContextBuilder::new(&self.config.store_name, &self.kb, state);
        let messages = ctx.build_messages(message);

        let model = self
            .config
            .model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model());

        let response = self
            .provider
            .chat(
                &messages,
                Some(model),
                self.config.max_tokens,
                self.config.temperature,
            )
            .await?;

        info!(
            model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            finish_reason = %response.finish_reason,
            "Fallback response complete"
        );

        response
            .content
            .filter(|c| !c.trim().is_empty())
            .context("LLM returned an empty reply")
    }

    /// Describe the product a message refers to.
    ///
    /// Colors named in the message narrow the color line, and a quantity
    /// above one adds a subtotal.
    pub fn product_details(
        &self,
        state: ConversationState,
        message: &str,
    ) -> (String, ConversationState) {
        let requested = catalog::find_product(&self.kb, &state, message)
            .map(|p| catalog::mentioned_colors(p, message))
            .unwrap_or_default();

        let (mut card, state) = catalog::lookup(&self.kb, state, message, &requested);

        let quantity = normalize::extract_quantity(message);
        if let Some(line) = state
            .last_product
            .as_ref()
            .filter(|_| card != catalog::PRODUCT_NOT_FOUND)
            .and_then(|p| catalog::quote(p, quantity))
        {
            card.push('\n');
            card.push_str(&line);
        }
        (card, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::SAMPLE_KNOWLEDGE_BASE;
    use crate::provider::types::{ChatMessage, LlmResponse, Usage};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct StubProvider {
        reply: Option<String>,
        calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
        models: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            model: Option<&str>,
            _max_tokens: u32,
            _temperature: f32,
        ) -> anyhow::Result<LlmResponse> {
            self.calls.lock().unwrap().push(messages.to_vec());
            self.models
                .lock()
                .unwrap()
                .push(model.unwrap_or("<none>").to_string());
            Ok(LlmResponse {
                content: self.reply.clone(),
                finish_reason: "stop".into(),
                usage: Usage::default(),
            })
        }

        fn default_model(&self) -> &str {
            "stub"
        }
    }

    fn chatbot(reply: Option<&str>) -> (Chatbot, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let provider = StubProvider {
            reply: reply.map(str::to_string),
            calls: Arc::clone(&calls),
            models: Arc::new(Mutex::new(Vec::new())),
        };
        let bot = Chatbot::new(
            KnowledgeBase::from_json(SAMPLE_KNOWLEDGE_BASE).unwrap(),
            Box::new(provider),
            ChatbotConfig {
                store_name: "Lumina Style".into(),
                model: None,
                max_tokens: 250,
                temperature: 1.0,
            },
        );
        (bot, calls)
    }

    #[tokio::test]
    async fn test_rule_answer_skips_model() {
        let (bot, calls) = chatbot(Some("não deveria"));
        let (reply, _) = bot.reply(ConversationState::new(), "aceita pix?").await.unwrap();
        assert_eq!(reply, "Pagando via PIX você ganha 10% de desconto 🔥");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_sends_context_and_raw_message() {
        let (bot, calls) = chatbot(Some("Temos sim!"));
        let (_, state) = bot.reply(ConversationState::new(), "troca?").await.unwrap();
        let (reply, _) = bot.reply(state, "Vocês têm LOJA física?").await.unwrap();
        assert_eq!(reply, "Temos sim!");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let messages = &calls[0];
        assert!(messages[0].content.contains("Último assunto detectado: troca"));
        assert!(messages[1].content.starts_with("Banco de dados: {\"menu\""));
        assert_eq!(messages[2], ChatMessage::user("Vocês têm LOJA física?"));
    }

    #[tokio::test]
    async fn test_model_defaults_to_provider_then_config() {
        let models = Arc::new(Mutex::new(Vec::new()));
        let provider = |models: &Arc<Mutex<Vec<String>>>| StubProvider {
            reply: Some("ok".into()),
            calls: Arc::new(Mutex::new(Vec::new())),
            models: Arc::clone(models),
        };
        let config = |model: Option<&str>| ChatbotConfig {
            store_name: "Lumina Style".into(),
            model: model.map(str::to_string),
            max_tokens: 250,
            temperature: 1.0,
        };
        let kb = || KnowledgeBase::from_json(SAMPLE_KNOWLEDGE_BASE).unwrap();

        let bot = Chatbot::new(kb(), Box::new(provider(&models)), config(None));
        bot.ask_model(&ConversationState::new(), "oi").await.unwrap();

        let bot = Chatbot::new(kb(), Box::new(provider(&models)), config(Some("llama-3.3-70b")));
        bot.ask_model(&ConversationState::new(), "oi").await.unwrap();

        assert_eq!(*models.lock().unwrap(), vec!["stub", "llama-3.3-70b"]);
    }

    #[tokio::test]
    async fn test_empty_model_reply_is_an_error() {
        let (bot, _) = chatbot(None);
        let err = bot.reply(ConversationState::new(), "oi").await.unwrap_err();
        assert!(err.to_string().contains("empty reply"));
    }

    #[test]
    fn test_product_details_with_colors_and_quantity() {
        let (bot, _) = chatbot(None);
        let (card, state) = bot.product_details(ConversationState::new(), "2 camisetas azul");
        assert!(card.starts_with("👕 Camiseta Oversized Urban Vibes — R$79.90\nCores disponíveis: Azul\n"));
        assert!(card.ends_with("Quantidade: 2 — Subtotal: R$159.80"));
        assert_eq!(state.last_product.unwrap().name, "Camiseta Oversized Urban Vibes");
    }

    #[test]
    fn test_product_details_not_found() {
        let (bot, _) = chatbot(None);
        let (card, _) = bot.product_details(ConversationState::new(), "3 guarda-chuvas");
        assert_eq!(card, catalog::PRODUCT_NOT_FOUND);
    }
}
