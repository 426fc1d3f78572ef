//! Rule-based intent matcher.
//!
//! Rules live in a fixed priority table and are evaluated top to bottom over
//! the normalized message; the first rule whose predicate holds answers the
//! turn and no later rule runs. The order is observable behavior: a CEP in the
//! message always wins, support beats shipping, shipping beats payment, and so
//! on down to promotions.

use tracing::debug;

use super::normalize::{extract_postal_code, normalize};
use super::state::ConversationState;
use crate::knowledge::KnowledgeBase;

/// Category keys in the order they are listed to the customer.
pub const CATEGORY_KEYS: &[&str] = &[
    "camiseta",
    "mochila",
    "vestido",
    "boné",
    "calça",
    "jaqueta",
    "tênis",
    "acessórios",
];

const SUPPORT_KEYWORDS: &[&str] = &[
    "suporte",
    "contato",
    "telefone",
    "email",
    "entrar em contato",
];

const SHIPPING_KEYWORDS: &[&str] = &[
    "frete",
    "quanto tempo",
    "entrega",
    "prazo",
    "demora",
    "quanto fica",
    "preco do frete",
    "valor do frete",
    "calcule",
];

const PAYMENT_KEYWORDS: &[&str] = &["pagamento", "pix", "cartão"];
const SIZE_CHART_KEYWORDS: &[&str] = &["tabela de medidas", "medidas"];
const RETURNS_KEYWORDS: &[&str] = &["troca", "devolução", "devolucoes"];
const TRACKING_KEYWORDS: &[&str] = &["rastrear", "pedido", "codigo"];
const HOURS_KEYWORDS: &[&str] = &["horário", "funcionamento"];
const SHOW_PRODUCTS_KEYWORDS: &[&str] = &["ver produtos", "produtos", "mostrar produtos"];
const PROMOTIONS_KEYWORDS: &[&str] = &["promoção", "promoçoes"];

/// Flat shipping price quoted once a CEP is known.
const STANDARD_SHIPPING: &str = "R$29,90";

/// Category of request recognized by the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    PostalCode,
    Support,
    ShippingCost,
    Payment,
    SizeChart,
    Returns,
    Tracking,
    Hours,
    ShowProducts,
    Category,
    Promotions,
}

impl Intent {
    /// Knowledge-base topic key recorded as the conversation's last topic.
    pub fn topic(self) -> &'static str {
        match self {
            Self::PostalCode => "cep",
            Self::Support => "suporte",
            Self::ShippingCost => "frete",
            Self::Payment => "pagamento",
            Self::SizeChart => "tabela de medidas",
            Self::Returns => "troca",
            Self::Tracking => "rastrear",
            Self::Hours => "horário",
            Self::ShowProducts => "produtos",
            Self::Category => "categorias",
            Self::Promotions => "promoções",
        }
    }
}

type Predicate = fn(&str) -> bool;
type Handler = fn(&KnowledgeBase, &mut ConversationState, &str) -> Option<String>;

struct Rule {
    intent: Intent,
    matches: Predicate,
    respond: Handler,
}

/// Priority-ordered rule table. Reordering changes which answer wins.
const RULES: &[Rule] = &[
    Rule {
        intent: Intent::PostalCode,
        matches: has_postal_code,
        respond: capture_postal_code,
    },
    Rule {
        intent: Intent::Support,
        matches: mentions_support,
        respond: support,
    },
    Rule {
        intent: Intent::ShippingCost,
        matches: mentions_shipping,
        respond: shipping_cost,
    },
    Rule {
        intent: Intent::Payment,
        matches: mentions_payment,
        respond: payment,
    },
    Rule {
        intent: Intent::SizeChart,
        matches: mentions_size_chart,
        respond: size_chart,
    },
    Rule {
        intent: Intent::Returns,
        matches: mentions_returns,
        respond: returns,
    },
    Rule {
        intent: Intent::Tracking,
        matches: mentions_tracking,
        respond: tracking,
    },
    Rule {
        intent: Intent::Hours,
        matches: mentions_hours,
        respond: hours,
    },
    Rule {
        intent: Intent::ShowProducts,
        matches: asks_for_products,
        respond: all_categories,
    },
    Rule {
        intent: Intent::Category,
        matches: mentions_category,
        respond: mentioned_categories,
    },
    Rule {
        intent: Intent::Promotions,
        matches: mentions_promotions,
        respond: promotions,
    },
];

/// Which rule would answer `message`, without running it.
pub fn classify(message: &str) -> Option<Intent> {
    let text = normalize(message.trim());
    RULES.iter().find(|r| (r.matches)(&text)).map(|r| r.intent)
}

/// Run the rule table over `message`.
///
/// Returns the canned answer (or `None` when the language model should take
/// over) together with the updated conversation state. A rule that matches
/// but has nothing to say still ends the cascade.
pub fn detect(
    kb: &KnowledgeBase,
    mut state: ConversationState,
    message: &str,
) -> (Option<String>, ConversationState) {
    let text = normalize(message.trim());

    let Some(rule) = RULES.iter().find(|r| (r.matches)(&text)) else {
        debug!("No rule matched");
        return (None, state);
    };

    let reply = (rule.respond)(kb, &mut state, &text).filter(|r| !r.is_empty());
    state.last_topic = Some(rule.intent.topic().to_string());

    debug!(intent = ?rule.intent, answered = reply.is_some(), "Rule matched");
    (reply, state)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// ── Predicates ──────────────────────────────────────────────────────

fn has_postal_code(text: &str) -> bool {
    extract_postal_code(text).is_some()
}

fn mentions_support(text: &str) -> bool {
    contains_any(text, SUPPORT_KEYWORDS)
}

fn mentions_shipping(text: &str) -> bool {
    contains_any(text, SHIPPING_KEYWORDS)
}

fn mentions_payment(text: &str) -> bool {
    contains_any(text, PAYMENT_KEYWORDS)
}

fn mentions_size_chart(text: &str) -> bool {
    contains_any(text, SIZE_CHART_KEYWORDS)
}

fn mentions_returns(text: &str) -> bool {
    contains_any(text, RETURNS_KEYWORDS)
}

fn mentions_tracking(text: &str) -> bool {
    contains_any(text, TRACKING_KEYWORDS)
}

fn mentions_hours(text: &str) -> bool {
    contains_any(text, HOURS_KEYWORDS)
}

fn asks_for_products(text: &str) -> bool {
    contains_any(text, SHOW_PRODUCTS_KEYWORDS)
}

fn mentions_category(text: &str) -> bool {
    contains_any(text, CATEGORY_KEYS)
}

fn mentions_promotions(text: &str) -> bool {
    contains_any(text, PROMOTIONS_KEYWORDS)
}

// ── Handlers ────────────────────────────────────────────────────────

fn capture_postal_code(
    _kb: &KnowledgeBase,
    state: &mut ConversationState,
    text: &str,
) -> Option<String> {
    let cep = extract_postal_code(text)?;
    let reply = format!("O frete para o seu endereço será calculado a partir do CEP {cep}.");
    state.postal_code = Some(cep);
    Some(reply)
}

fn support(kb: &KnowledgeBase, _state: &mut ConversationState, _text: &str) -> Option<String> {
    Some(kb.text_or("suporte", "Não encontrei informações de contato."))
}

fn shipping_cost(
    _kb: &KnowledgeBase,
    state: &mut ConversationState,
    _text: &str,
) -> Option<String> {
    Some(match &state.postal_code {
        Some(cep) => format!(
            "O frete para {cep} será de {STANDARD_SHIPPING} para envio padrão 🚚. Prazo: 3–7 dias úteis."
        ),
        None => "🚚 Para calcular o frete, me informe o CEP, por favor.".to_string(),
    })
}

fn payment(kb: &KnowledgeBase, _state: &mut ConversationState, text: &str) -> Option<String> {
    let specific = if text.contains("pix") {
        "pix"
    } else if text.contains("cartão") {
        "cartão"
    } else {
        return Some(kb.text_or("pagamento", "Aceitamos PIX, cartão e boleto."));
    };
    kb.text(specific)
        .or_else(|| kb.text("pagamento"))
        .map(str::to_string)
}

fn size_chart(kb: &KnowledgeBase, _state: &mut ConversationState, _text: &str) -> Option<String> {
    Some(kb.text_or("tabela de medidas", "Não encontrei a tabela de medidas."))
}

fn returns(kb: &KnowledgeBase, _state: &mut ConversationState, _text: &str) -> Option<String> {
    Some(kb.text_or("troca", "Não encontrei informações sobre troca/devolução."))
}

fn tracking(kb: &KnowledgeBase, _state: &mut ConversationState, _text: &str) -> Option<String> {
    Some(kb.text_or("rastrear", "Não encontrei informações sobre rastreamento."))
}

fn hours(kb: &KnowledgeBase, _state: &mut ConversationState, _text: &str) -> Option<String> {
    Some(kb.text_or("horário", "Não encontrei informações sobre horário."))
}

fn promotions(kb: &KnowledgeBase, _state: &mut ConversationState, _text: &str) -> Option<String> {
    Some(kb.text_or("promoções", "Não há promoções no momento."))
}

fn all_categories(
    kb: &KnowledgeBase,
    _state: &mut ConversationState,
    _text: &str,
) -> Option<String> {
    Some(list_categories(kb, |_| true))
}

fn mentioned_categories(
    kb: &KnowledgeBase,
    _state: &mut ConversationState,
    text: &str,
) -> Option<String> {
    Some(list_categories(kb, |key| text.contains(key)))
}

/// Category entries (with their colors) joined by blank lines.
fn list_categories(kb: &KnowledgeBase, include: impl Fn(&str) -> bool) -> String {
    CATEGORY_KEYS
        .iter()
        .copied()
        .filter(|key| include(key))
        .filter_map(|key| {
            let mut block = kb.text(key)?.to_string();
            if let Some(colors) = kb.category_colors(key) {
                block.push_str(&format!("\nCores disponíveis: {}", colors.join(", ")));
            }
            Some(block)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
