//! Configuration module for lumina.
//!
//! Loads typed configuration from `config.json` in the working directory or
//! from `~/.lumina/config.json`. All fields use `serde` defaults, so an empty
//! or missing file yields a usable configuration apart from the API key.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::knowledge::SAMPLE_KNOWLEDGE_BASE;

/// Environment variable that supplies the Groq API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub assistant: AssistantConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// Priority:
    /// 1. local `config.json` in current directory
    /// 2. `~/.lumina/config.json`
    /// 3. built-in defaults
    ///
    /// `GROQ_API_KEY` overrides the groq key in every case.
    pub fn load() -> anyhow::Result<Self> {
        let paths = [PathBuf::from("config.json"), Self::default_path()];

        let mut config = match paths.iter().find(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading config from: {}", path.display());
                Self::load_from(path)?
            }
            None => Config::default(),
        };

        if let Ok(key) = std::env::var(GROQ_API_KEY_ENV) {
            config.apply_groq_key(key);
        }
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn apply_groq_key(&mut self, key: String) {
        if key.is_empty() {
            return;
        }
        tracing::info!("Using Groq API key from environment variable");
        self.providers.groq.get_or_insert_with(ProviderEntry::default).api_key = key;
    }

    /// Get the default config file path (`~/.lumina/config.json`).
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Get the default config directory path.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lumina")
    }

    /// Get the resolved knowledge-base path.
    pub fn knowledge_base_path(&self) -> PathBuf {
        let raw = &self.store.knowledge_base;
        if raw.starts_with("~/") || raw.starts_with("~\\") {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(&raw[2..])
        } else {
            PathBuf::from(raw)
        }
    }

    /// Write the default config template and a sample knowledge base to disk.
    ///
    /// An existing knowledge base is left untouched.
    pub fn write_default_template() -> anyhow::Result<(PathBuf, PathBuf)> {
        let dir = Self::config_dir();
        std::fs::create_dir_all(&dir)?;

        let kb_path = dir.join("bd.json");
        if !kb_path.exists() {
            std::fs::write(&kb_path, SAMPLE_KNOWLEDGE_BASE)?;
        }

        let template = serde_json::json!({
            "providers": {
                "groq": {
                    "apiKey": "gsk_YOUR_KEY_HERE"
                }
            },
            "assistant": {
                "model": AssistantConfig::default().model
            },
            "store": {
                "knowledgeBase": "~/.lumina/bd.json"
            }
        });

        let path = Self::default_path();
        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        Ok((path, kb_path))
    }

    /// Validate configuration and return actionable error messages.
    ///
    /// Checks that:
    /// - At least one provider has a real (non-placeholder) API key
    /// - The model is not empty
    /// - The completion length is positive
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.providers.find_active().is_none() {
            errors.push(format!(
                "No LLM provider configured with a real API key. \
                 Set {GROQ_API_KEY_ENV} or edit config.json and replace the placeholder key."
            ));
        }

        if self.assistant.model.is_empty() {
            errors.push("assistant.model is empty. Specify a model name.".into());
        }

        if self.assistant.max_tokens == 0 {
            errors.push("assistant.maxTokens must be greater than zero.".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ── Provider Configuration ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderEntry {
    pub api_key: String,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub groq: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
    pub openai: Option<ProviderEntry>,
    pub deepseek: Option<ProviderEntry>,
    pub gemini: Option<ProviderEntry>,
    pub vllm: Option<ProviderEntry>,
}

impl ProvidersConfig {
    /// Find the first configured provider (has a non-empty, non-placeholder API key).
    pub fn find_active(&self) -> Option<(&'static str, &ProviderEntry)> {
        self.find_all_active().into_iter().next()
    }

    /// Find all configured providers that have a real API key, groq first.
    pub fn find_all_active(&self) -> Vec<(&'static str, &ProviderEntry)> {
        let candidates: [(&'static str, &Option<ProviderEntry>); 6] = [
            ("groq", &self.groq),
            ("openrouter", &self.openrouter),
            ("openai", &self.openai),
            ("deepseek", &self.deepseek),
            ("gemini", &self.gemini),
            ("vllm", &self.vllm),
        ];

        candidates
            .into_iter()
            .filter_map(|(name, entry)| entry.as_ref().map(|e| (name, e)))
            .filter(|(_, e)| !e.api_key.is_empty() && !e.api_key.contains("YOUR_"))
            .collect()
    }
}

// ── Assistant Configuration ─────────────────────────────────────────

/// Settings of the language-model fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssistantConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".into(),
            max_tokens: 250,
            temperature: 1.0,
        }
    }
}

// ── Store Configuration ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub name: String,
    pub knowledge_base: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "Lumina Style".into(),
            knowledge_base: "bd.json".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.assistant.model, "llama-3.1-8b-instant");
        assert_eq!(config.assistant.max_tokens, 250);
        assert_eq!(config.store.name, "Lumina Style");
        assert_eq!(config.knowledge_base_path(), PathBuf::from("bd.json"));
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let json = r#"{"providers": {"groq": {"apiKey": "gsk_test"}}, "assistant": {"maxTokens": 100}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.providers.groq.unwrap().api_key, "gsk_test");
        assert_eq!(config.assistant.max_tokens, 100);
        assert_eq!(config.assistant.model, "llama-3.1-8b-instant");
    }

    #[test]
    fn test_find_active_skips_placeholders() {
        let json = r#"{"providers": {
            "groq": {"apiKey": "gsk_YOUR_KEY_HERE"},
            "openai": {"apiKey": "sk-real"}
        }}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let (name, entry) = config.providers.find_active().unwrap();
        assert_eq!(name, "openai");
        assert_eq!(entry.api_key, "sk-real");
    }

    #[test]
    fn test_groq_key_override() {
        let mut config = Config::default();
        config.apply_groq_key("gsk_env".into());
        let (name, entry) = config.providers.find_active().unwrap();
        assert_eq!(name, "groq");
        assert_eq!(entry.api_key, "gsk_env");
    }

    #[test]
    fn test_validate() {
        let errors = Config::default().validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(GROQ_API_KEY_ENV));

        let mut config = Config::default();
        config.apply_groq_key("gsk_env".into());
        config.assistant.model.clear();
        config.assistant.max_tokens = 0;
        assert_eq!(config.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_tilde_knowledge_base_path() {
        let mut config = Config::default();
        config.store.knowledge_base = "~/.lumina/bd.json".into();
        let path = config.knowledge_base_path();
        assert!(path.ends_with(".lumina/bd.json"));
        assert!(!path.starts_with("~"));
    }
}
