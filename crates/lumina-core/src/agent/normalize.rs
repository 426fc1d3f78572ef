//! Message normalization and the small extractors used by the rules.

use regex::Regex;
use std::sync::LazyLock;

/// Informal or plural terms and the canonical form they are rewritten to.
///
/// Applied in order as plain substring replacements over the lowercased text.
/// Replacement is not word-boundary aware, so `tenis` inside a longer word is
/// rewritten too.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("camisas", "camiseta"),
    ("camisetas", "camiseta"),
    ("blusas", "camiseta"),
    ("tenis", "tênis"),
    ("sapatos", "tênis"),
    ("mochilas", "mochila"),
    ("vestidos", "vestido"),
    ("bones", "boné"),
    ("bonés", "boné"),
    ("calcas", "calça"),
    ("calças", "calça"),
    ("jaquetas", "jaqueta"),
    ("acessorios", "acessórios"),
    ("promoções", "promoções"),
    ("fretes", "frete"),
    ("pagamentos", "pagamento"),
    ("prazo", "frete"),
    ("entrega", "frete"),
    ("tempo", "frete"),
];

/// Number words recognized by [`extract_quantity`], checked in order.
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("um", 1),
    ("uma", 1),
    ("dois", 2),
    ("duas", 2),
    ("três", 3),
    ("quatro", 4),
    ("cinco", 5),
    ("seis", 6),
    ("sete", 7),
    ("oito", 8),
    ("nove", 9),
    ("dez", 10),
];

/// Brazilian CEP: five digits, optional hyphen, three digits.
static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}-?\d{3}\b").unwrap());

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Lowercase `text` and rewrite every known synonym to its canonical form.
pub fn normalize(text: &str) -> String {
    SYNONYMS
        .iter()
        .fold(text.to_lowercase(), |acc, (from, to)| acc.replace(from, to))
}

/// First quantity mentioned in `text`: a digit run, else a number word, else 1.
pub fn extract_quantity(text: &str) -> u32 {
    if let Some(n) = DIGITS_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
    {
        return n;
    }

    let lower = text.to_lowercase();
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map(|(_, value)| *value)
        .unwrap_or(1)
}

/// First CEP-shaped token in `text`, returned verbatim.
pub fn extract_postal_code(text: &str) -> Option<String> {
    POSTAL_CODE_RE.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plurals() {
        assert_eq!(normalize("Quero ver CAMISETAS"), "quero ver camiseta");
        assert_eq!(normalize("tem bonés e calças?"), "tem boné e calça?");
        assert_eq!(normalize("sapatos"), "tênis");
    }

    #[test]
    fn test_normalize_shipping_terms() {
        assert_eq!(normalize("qual o prazo de entrega"), "qual o frete de frete");
        assert_eq!(normalize("quanto tempo demora"), "quanto frete demora");
    }

    #[test]
    fn test_normalize_is_not_word_aware() {
        // "contempo" contains "tempo"
        assert_eq!(normalize("contemporâneo"), "confreterâneo");
    }

    #[test]
    fn test_extract_quantity_digits() {
        assert_eq!(extract_quantity("quero 3 camisetas e 2 bonés"), 3);
        assert_eq!(extract_quantity("12"), 12);
    }

    #[test]
    fn test_extract_quantity_ignores_non_ascii_digits() {
        assert_eq!(extract_quantity("quero ٣ e 2"), 2);
        assert_eq!(extract_quantity("quero ٣ duas"), 2);
    }

    #[test]
    fn test_extract_quantity_words() {
        assert_eq!(extract_quantity("quero duas mochilas"), 2);
        assert_eq!(extract_quantity("Quatro calças"), 4);
        assert_eq!(extract_quantity("quero ver"), 1);
    }

    #[test]
    fn test_extract_quantity_word_order() {
        // "um" is checked first and matches inside "algum"
        assert_eq!(extract_quantity("algum desconto pra cinco?"), 1);
    }

    #[test]
    fn test_extract_quantity_overflow_falls_back() {
        assert_eq!(extract_quantity("99999999999999999999 dez"), 10);
    }

    #[test]
    fn test_extract_postal_code() {
        assert_eq!(extract_postal_code("meu cep é 01001-000"), Some("01001-000".into()));
        assert_eq!(extract_postal_code("cep 01001000 ok"), Some("01001000".into()));
        assert_eq!(extract_postal_code("pedido 1234-567"), None);
        assert_eq!(extract_postal_code("0100100000"), None);
    }
}
