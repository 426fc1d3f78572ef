//! 🛍️ lumina CLI — interactive store assistant, onboarding, and status commands.
//!
//! Usage:
//!   lumina chat          — Start an interactive chat session (default)
//!   lumina onboard       — Create a default configuration and knowledge base
//!   lumina status        — Show current configuration and knowledge base

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use lumina_core::agent::{Chatbot, ChatbotConfig, ConversationState};
use lumina_core::config::Config;
use lumina_core::knowledge::KnowledgeBase;
use lumina_core::provider::openai::OpenAiProvider;

/// Words that end the chat, compared case-insensitively.
const EXIT_COMMANDS: &[&str] = &["sair", "quit", "tchau"];

const FAREWELL: &str = "Bot: Até breve! 💙";

#[derive(Parser)]
#[command(
    name = "lumina",
    version,
    about = "Lumina Style store assistant",
    long_about = "🛍️ lumina — answers store questions from a local knowledge base and asks a hosted LLM for everything else."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,

        /// Knowledge base JSON file (overrides config)
        #[arg(short, long)]
        knowledge: Option<PathBuf>,
    },

    /// Create the default configuration and a sample knowledge base
    Onboard,

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the chat transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Chat { model, knowledge }) => cmd_chat(model.as_deref(), knowledge).await?,
        Some(Commands::Onboard) => cmd_onboard()?,
        Some(Commands::Status) => cmd_status()?,
        None => cmd_chat(None, None).await?,
    }

    Ok(())
}

// ── Shared Setup ────────────────────────────────────────────────────

fn validate_config(config: &Config) -> Result<()> {
    if let Err(errors) = config.validate() {
        eprintln!("\n  \x1b[31m❌ Configuration errors:\x1b[0m");
        for e in &errors {
            eprintln!("     • {}", e);
        }
        eprintln!();
        anyhow::bail!("Fix the above {} error(s) in config.json", errors.len());
    }
    Ok(())
}

/// Load the knowledge base and wire the provider into a `Chatbot`.
fn setup_chatbot(
    config: &Config,
    model_override: Option<&str>,
    knowledge_override: Option<PathBuf>,
) -> Result<Chatbot> {
    let kb_path = knowledge_override.unwrap_or_else(|| config.knowledge_base_path());
    let kb = KnowledgeBase::load(&kb_path)
        .context("Cannot start without a knowledge base (run `lumina onboard`)")?;

    let (name, entry) = config.providers.find_active().context(
        "No LLM provider configured with a real API key. \
         Run `lumina onboard` first, then edit config.json",
    )?;

    let model = model_override
        .or(entry.model.as_deref())
        .unwrap_or(&config.assistant.model);

    let provider = OpenAiProvider::new(
        name,
        &entry.api_key,
        entry.api_base.as_deref(),
        model,
        reqwest::Client::new(),
    );

    tracing::debug!(provider = name, model, kb = %kb_path.display(), "Chatbot ready");

    Ok(Chatbot::new(
        kb,
        Box::new(provider),
        ChatbotConfig {
            store_name: config.store.name.clone(),
            model: None,
            max_tokens: config.assistant.max_tokens,
            temperature: config.assistant.temperature,
        },
    ))
}

// ── Chat Command ────────────────────────────────────────────────────

async fn cmd_chat(model_override: Option<&str>, knowledge_override: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    validate_config(&config)?;

    let bot = setup_chatbot(&config, model_override, knowledge_override)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    chat_loop(&bot, &config.store.name, stdin.lock(), &mut stdout).await
}

fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS.iter().any(|c| input.eq_ignore_ascii_case(c))
}

/// Query text of a `/produto` command, or `None` for any other input.
fn product_query(input: &str) -> Option<&str> {
    match input.strip_prefix("/produto")? {
        "" => Some(""),
        rest if rest.starts_with(char::is_whitespace) => Some(rest.trim()),
        _ => None,
    }
}

/// Read-eval-print loop over any line source.
///
/// A provider error ends the loop and is returned to the caller.
async fn chat_loop<R: BufRead, W: Write>(
    bot: &Chatbot,
    store_name: &str,
    input: R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "🛍️ Chatbot {} iniciado!", store_name)?;

    let mut state = ConversationState::new();
    let mut lines = input.lines();

    loop {
        write!(out, "\nVocê: ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            writeln!(out, "{}", FAREWELL)?;
            break;
        };
        let line = line?;
        let input = line.trim();

        if is_exit_command(input) {
            writeln!(out, "{}", FAREWELL)?;
            break;
        }
        if input.is_empty() {
            continue;
        }

        // Handle commands
        if input == "/status" {
            writeln!(out, "Bot:\n{}", state.summary())?;
            continue;
        }
        if let Some(query) = product_query(input) {
            let (card, next) = bot.product_details(state, query);
            state = next;
            writeln!(out, "Bot:\n{}", card)?;
            continue;
        }

        // Rules trim on their own; the model sees the line as typed.
        let (reply, next) = bot.reply(state, &line).await?;
        state = next;
        writeln!(out, "Bot:\n{}", reply)?;
    }

    Ok(())
}

// ── Onboard Command ─────────────────────────────────────────────────

fn cmd_onboard() -> Result<()> {
    let (config_path, kb_path) = Config::write_default_template()?;
    println!();
    println!("  ✅ Configuration created at:");
    println!("     {}", config_path.display());
    println!("  📚 Knowledge base:");
    println!("     {}", kb_path.display());
    println!();
    println!("  Next steps:");
    println!("  1. Edit the config file and add your Groq API key (or export GROQ_API_KEY)");
    println!("  2. Run `lumina chat` to start chatting");
    println!();
    Ok(())
}

// ── Status Command ──────────────────────────────────────────────────

fn cmd_status() -> Result<()> {
    let config_path = Config::default_path();
    let config = Config::load()?;

    println!();
    println!("  🛍️ lumina status");
    println!("  ─────────────────────────────────────");

    if config_path.exists() {
        println!("  Config:    {}", config_path.display());
    } else {
        println!("  Config:    ⚠️  Not found (run `lumina onboard`), using defaults");
    }

    match config.providers.find_active() {
        Some((name, _)) => println!("  Provider:  ✅ {} configured", name),
        None => println!("  Provider:  ❌ No provider configured"),
    }

    println!("  Model:     {}", config.assistant.model);
    println!("  Store:     {}", config.store.name);

    let kb_path = config.knowledge_base_path();
    match KnowledgeBase::load(&kb_path) {
        Ok(kb) => println!(
            "  Knowledge: ✅ {} ({} topics, {} products)",
            kb_path.display(),
            kb.topic_count(),
            kb.products().len()
        ),
        Err(e) => println!("  Knowledge: ❌ {}", e),
    }

    println!();
    Ok(())
}
