use ledgerline_core::{ParseError, Result};
use tracing::debug;

use crate::grammar::{CompiledGrammar, GrammarRegistry, fold_for_markers};

/// Pick the grammar for a raw statement: the first registered grammar with
/// a marker present in the lowercased, whitespace-collapsed text.
pub fn detect<'a>(registry: &'a GrammarRegistry, raw: &str) -> Result<&'a CompiledGrammar> {
    let folded = fold_for_markers(raw);
    let grammar = registry
        .iter()
        .find(|g| g.matches_markers(&folded))
        .ok_or(ParseError::FormatNotRecognized)?;
    debug!(bank = %grammar.bank(), "statement format detected");
    Ok(grammar)
}
