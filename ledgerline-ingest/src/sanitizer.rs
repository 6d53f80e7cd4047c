use regex::Regex;
use std::sync::OnceLock;

use crate::grammar::CompiledGrammar;

/// Description used when nothing readable survives cleaning.
pub const FALLBACK_DESCRIPTION: &str = "Transaction";

fn leading_noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\s0-9\-.,;:*/#]+").expect("leading noise regex"))
}

/// Clean a raw row description for display.
pub fn sanitize(raw: &str, grammar: &CompiledGrammar) -> String {
    let cut = grammar
        .boilerplate()
        .and_then(|re| re.find(raw))
        .map_or(raw.len(), |m| m.start());
    let text = &raw[..cut];

    let mut stripped = String::with_capacity(text.len());
    let mut cursor = 0;
    for token in grammar.scan_money(text) {
        stripped.push_str(&text[cursor..token.start]);
        stripped.push(' ');
        cursor = token.end;
    }
    stripped.push_str(&text[cursor..]);

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = leading_noise_re().replace(&collapsed, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        FALLBACK_DESCRIPTION.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarRegistry;
    use ledgerline_core::Bank;

    fn grammar(bank: Bank) -> CompiledGrammar {
        GrammarRegistry::builtin().get(&bank).unwrap().clone()
    }

    #[test]
    fn test_truncates_at_boilerplate() {
        let g = grammar(Bank::Capitec);
        assert_eq!(
            sanitize("Checkers Sea Point unique document no 123456", &g),
            "Checkers Sea Point"
        );
    }

    #[test]
    fn test_boilerplate_is_word_anchored() {
        let g = grammar(Bank::Absa);
        assert_eq!(
            sanitize("Transfer to ABSA BANK LIMITED Reg No 1986/004794/06", &g),
            "Transfer to"
        );
        assert_eq!(sanitize("Grabsa Bank Limited", &g), "Grabsa Bank Limited");
    }

    #[test]
    fn test_removes_money_and_leading_noise() {
        let g = grammar(Bank::Nedbank);
        assert_eq!(sanitize("12 - : Uber Eats R 45.00 trip", &g), "Uber Eats trip");
    }

    #[test]
    fn test_fallback_when_empty() {
        let g = grammar(Bank::Nedbank);
        assert_eq!(sanitize("  12.50 ", &g), FALLBACK_DESCRIPTION);
        assert_eq!(sanitize("", &g), FALLBACK_DESCRIPTION);
    }
}
