//! Statement header scanning: account, holder, period and declared balances.

use ledgerline_core::dates::parse_date_loose;
use ledgerline_core::{StatementMetadata, StatementPeriod, UNKNOWN_ACCOUNT};
use regex::Regex;

use crate::grammar::CompiledGrammar;

/// Header facts as found, each optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderFields {
    pub account_id: Option<String>,
    pub account_holder: Option<String>,
    pub period: Option<StatementPeriod>,
    pub opening_balance: Option<f64>,
    pub closing_balance: Option<f64>,
}

impl HeaderFields {
    /// Fill in defaults. `opening_seed` is the brought-forward row amount,
    /// used when the header itself declares no opening balance.
    pub fn into_metadata(
        self,
        grammar: &CompiledGrammar,
        opening_seed: Option<f64>,
    ) -> StatementMetadata {
        StatementMetadata {
            bank: grammar.bank().clone(),
            account_id: self
                .account_id
                .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string()),
            account_holder: self.account_holder,
            period: self.period,
            opening_balance: self.opening_balance.or(opening_seed),
            closing_balance: self.closing_balance,
            currency: grammar.currency().to_string(),
        }
    }
}

fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn labelled_amount(labels: &[Regex], text: &str, grammar: &CompiledGrammar) -> Option<f64> {
    labels.iter().find_map(|re| {
        re.find_iter(text)
            .find_map(|m| grammar.money_after(text, m.end()))
            .map(|t| t.balance_value())
    })
}

fn period(patterns: &[Regex], text: &str) -> Option<StatementPeriod> {
    patterns.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let from = parse_date_loose(caps.get(1)?.as_str())?;
        let to = parse_date_loose(caps.get(2)?.as_str())?;
        Some(StatementPeriod { from, to })
    })
}

/// Scan normalized statement text with the grammar's header rules.
pub fn extract_header(text: &str, grammar: &CompiledGrammar) -> HeaderFields {
    HeaderFields {
        account_id: first_capture(grammar.account_patterns(), text)
            .map(|a| a.chars().filter(|c| *c != ' ' && *c != '-').collect()),
        account_holder: first_capture(grammar.holder_patterns(), text),
        period: period(grammar.period_patterns(), text),
        opening_balance: labelled_amount(grammar.opening_labels(), text, grammar),
        closing_balance: labelled_amount(grammar.closing_labels(), text, grammar),
    }
}
