//! 🛍️ lumina-core: Core library for the Lumina Style store assistant.
//!
//! This crate contains the building blocks of a small rule-based store
//! assistant with a language-model fallback:
//!
//! - [`config`] — Typed configuration loading from JSON
//! - [`knowledge`] — Static knowledge base (canned answers and products)
//! - [`agent`] — Rule table, product lookup, conversation state, turn handling
//! - [`provider`] — LLM provider trait and OpenAI-compatible implementation
//!
//! # Quick Start
//!
//! ```no_run
//! use lumina_core::agent::{Chatbot, ChatbotConfig, ConversationState};
//! use lumina_core::config::Config;
//! use lumina_core::knowledge::KnowledgeBase;
//! use lumina_core::provider::openai::OpenAiProvider;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let kb = KnowledgeBase::load(&config.knowledge_base_path())?;
//!
//! let (name, entry) = config.providers.find_active().expect("no provider");
//! let provider = OpenAiProvider::new(
//!     name,
//!     &entry.api_key,
//!     entry.api_base.as_deref(),
//!     &config.assistant.model,
//!     reqwest::Client::new(),
//! );
//!
//! let bot = Chatbot::new(
//!     kb,
//!     Box::new(provider),
//!     ChatbotConfig {
//!         store_name: config.store.name.clone(),
//!         model: None,
//!         max_tokens: config.assistant.max_tokens,
//!         temperature: config.assistant.temperature,
//!     },
//! );
//!
//! let (reply, _state) = bot.reply(ConversationState::new(), "aceita pix?").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod knowledge;
pub mod provider;
