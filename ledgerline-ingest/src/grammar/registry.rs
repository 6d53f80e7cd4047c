use ledgerline_core::Bank;

use super::builtin::builtin_grammars;
use super::compiled::{CompiledGrammar, GrammarError};
use super::LayoutGrammar;

/// Ordered set of compiled grammars. Detection walks it front to back, so
/// the first grammar whose markers match wins.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: Vec<CompiledGrammar>,
}

impl GrammarRegistry {
    /// Registry holding the shipped grammars in detection order.
    pub fn builtin() -> Self {
        let grammars = builtin_grammars()
            .into_iter()
            .map(|g| CompiledGrammar::compile(g).expect("built-in grammar compiles"))
            .collect();
        Self { grammars }
    }

    /// Compile and add a grammar. A grammar for a bank that is already
    /// registered replaces it in place; a new bank is tried before every
    /// existing grammar.
    pub fn register(&mut self, grammar: LayoutGrammar) -> Result<(), GrammarError> {
        let compiled = CompiledGrammar::compile(grammar)?;
        match self.grammars.iter().position(|g| g.bank() == compiled.bank()) {
            Some(i) => self.grammars[i] = compiled,
            None => self.grammars.insert(0, compiled),
        }
        Ok(())
    }

    pub fn get(&self, bank: &Bank) -> Option<&CompiledGrammar> {
        self.grammars.iter().find(|g| g.bank() == bank)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledGrammar> {
        self.grammars.iter()
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}
