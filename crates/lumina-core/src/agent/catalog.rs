//! Product lookup over the `produtos` list of the knowledge base.
//!
//! Search falls back in three tiers: a product whose name appears in the
//! message, then a product with a category that appears in the message, then
//! the last product shown in this conversation.

use tracing::debug;

use super::normalize::normalize;
use super::state::ConversationState;
use crate::knowledge::{KnowledgeBase, Product};

/// Reply when no tier finds a product.
pub const PRODUCT_NOT_FOUND: &str =
    "Não encontrei esse produto no momento. Pode tentar outro nome ou categoria.";

const SEPARATOR_WIDTH: usize = 40;

/// Find the product a message refers to, without touching the state.
pub fn find_product<'a>(
    kb: &'a KnowledgeBase,
    state: &'a ConversationState,
    message: &str,
) -> Option<&'a Product> {
    let text = normalize(message);
    let products = kb.products();

    products
        .iter()
        .find(|p| text.contains(&p.name.to_lowercase()))
        .or_else(|| {
            products.iter().find(|p| {
                p.categories
                    .iter()
                    .any(|c| text.contains(&c.to_lowercase()))
            })
        })
        .or(state.last_product.as_ref())
}

/// Look up a product and describe it.
///
/// `requested_colors`, when not empty, replaces the product's own colors in
/// the description. The found product becomes the conversation's last product.
pub fn lookup(
    kb: &KnowledgeBase,
    mut state: ConversationState,
    message: &str,
    requested_colors: &[String],
) -> (String, ConversationState) {
    let Some(product) = find_product(kb, &state, message).cloned() else {
        debug!("Product lookup found nothing");
        return (PRODUCT_NOT_FOUND.to_string(), state);
    };

    debug!(product = %product.name, "Product lookup hit");
    let reply = format_product(&product, requested_colors);
    state.last_product = Some(product);
    (reply, state)
}

/// Multi-line product card: header with price, colors, description, separator.
pub fn format_product(product: &Product, requested_colors: &[String]) -> String {
    let mut out = format!(
        "{} {} — R${:.2}\n",
        product.emoji, product.name, product.price
    );
    if let Some(own) = &product.colors {
        let colors = if requested_colors.is_empty() {
            own.as_slice()
        } else {
            requested_colors
        };
        out.push_str(&format!("Cores disponíveis: {}\n", colors.join(", ")));
    }
    out.push_str(&format!("Descrição: {}\n", product.description));
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out
}

/// The product's colors that the message names, in the product's order.
pub fn mentioned_colors(product: &Product, message: &str) -> Vec<String> {
    let text = message.to_lowercase();
    product
        .colors
        .iter()
        .flatten()
        .filter(|c| text.contains(&c.to_lowercase()))
        .cloned()
        .collect()
}

/// Subtotal line for more than one unit.
pub fn quote(product: &Product, quantity: u32) -> Option<String> {
    (quantity > 1).then(|| {
        format!(
            "Quantidade: {} — Subtotal: R${:.2}",
            quantity,
            product.price * f64::from(quantity)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::SAMPLE_KNOWLEDGE_BASE;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::from_json(SAMPLE_KNOWLEDGE_BASE).unwrap()
    }

    #[test]
    fn test_lookup_by_name() {
        let (reply, state) = lookup(
            &kb(),
            ConversationState::new(),
            "Boné Classic Street tem?",
            &[],
        );
        assert_eq!(
            reply,
            format!(
                "🧢 Boné Classic Street — R$59.90\n\
                 Cores disponíveis: Preto, Branco, Azul\n\
                 Descrição: Aba curva e regulagem traseira em metal.\n{}",
                "-".repeat(40)
            )
        );
        assert_eq!(state.last_product.unwrap().name, "Boné Classic Street");
    }

    #[test]
    fn test_name_beats_category() {
        // "mochila" is a category of the backpack, but the name match comes first
        let (reply, _) = lookup(
            &kb(),
            ConversationState::new(),
            "vestido midi floral ou mochila?",
            &[],
        );
        assert!(reply.starts_with("👗 Vestido Midi Floral"));
    }

    #[test]
    fn test_lookup_by_category_after_normalizing() {
        let (reply, _) = lookup(&kb(), ConversationState::new(), "tem sapatos?", &[]);
        assert!(reply.starts_with("👟 Tênis Urban Comfort — R$199.90"));
    }

    #[test]
    fn test_falls_back_to_last_product() {
        let (_, state) = lookup(
            &kb(),
            ConversationState::new(),
            "jaqueta? não, quero o colar",
            &[],
        );
        let (reply, state) = lookup(&kb(), state, "e quanto custa?", &[]);
        assert!(reply.starts_with("💍 Colar Lua Dourada — R$29.90"));
        assert_eq!(state.last_product.unwrap().name, "Colar Lua Dourada");
    }

    #[test]
    fn test_not_found() {
        let (reply, state) = lookup(&kb(), ConversationState::new(), "bom dia", &[]);
        assert_eq!(reply, PRODUCT_NOT_FOUND);
        assert!(state.last_product.is_none());
    }

    #[test]
    fn test_requested_colors_override() {
        let kb = kb();
        let product = &kb.products()[0];
        let card = format_product(product, &["Azul".to_string()]);
        assert!(card.contains("Cores disponíveis: Azul\n"));
    }

    #[test]
    fn test_product_without_colors_has_no_color_line() {
        let product = kb().products()[5].clone();
        let card = format_product(&product, &["Azul".to_string()]);
        assert!(!card.contains("Cores"));
        assert!(card.ends_with(&"-".repeat(40)));
    }

    #[test]
    fn test_mentioned_colors() {
        let kb = kb();
        let product = &kb.products()[0];
        assert_eq!(
            mentioned_colors(product, "tem camiseta AZUL ou preto?"),
            vec!["Preto".to_string(), "Azul".to_string()]
        );
        assert!(mentioned_colors(product, "tem rosa?").is_empty());
    }

    #[test]
    fn test_quote() {
        let kb = kb();
        let product = &kb.products()[0];
        assert_eq!(quote(product, 1), None);
        assert_eq!(
            quote(product, 2).as_deref(),
            Some("Quantidade: 2 — Subtotal: R$159.80")
        );
    }
}
