//! The statement parsing pipeline, wired end to end.

use ledgerline_core::{
    BALANCE_EPSILON, Bank, ParseError, ParsedStatement, Result, Transaction, round_cents, within,
};
use tracing::{debug, info};

use crate::detector::detect;
use crate::extractor::{DateContext, Extraction, extract};
use crate::grammar::{CompiledGrammar, GrammarRegistry};
use crate::metadata::extract_header;
use crate::normalizer::normalize;
use crate::reconciler::{Resolution, reconcile};
use crate::sanitizer::sanitize;
use crate::segmenter::segment;
use crate::validator::{LedgerIssue, ReviewNote, validate_ledger};

/// Parses extracted statement text against a registry of layout grammars.
///
/// Holds no per-parse state; one parser can serve any number of calls.
#[derive(Debug, Clone)]
pub struct StatementParser {
    registry: GrammarRegistry,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StatementParser {
    pub fn new(registry: GrammarRegistry) -> Self {
        Self { registry }
    }

    pub fn builtin() -> Self {
        Self::new(GrammarRegistry::builtin())
    }

    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    pub fn detect(&self, raw: &str) -> Result<&CompiledGrammar> {
        detect(&self.registry, raw)
    }

    /// Parse one statement. A `hint` skips detection and must name a
    /// registered grammar.
    pub fn parse(&self, raw: &str, hint: Option<&Bank>) -> Result<ParsedStatement> {
        let grammar = match hint {
            Some(bank) => self
                .registry
                .get(bank)
                .ok_or_else(|| ParseError::UnsupportedFormat(bank.clone()))?,
            None => self.detect(raw)?,
        };
        parse_with_grammar(raw, grammar)
    }
}

/// Run the pipeline with a known grammar.
pub fn parse_with_grammar(raw: &str, grammar: &CompiledGrammar) -> Result<ParsedStatement> {
    let normalized = normalize(raw, grammar);
    let header = extract_header(&normalized, grammar);
    let segmentation = segment(&normalized, grammar)?;
    let ctx = DateContext::new(header.period.as_ref(), &normalized);

    let mut candidates = Vec::with_capacity(segmentation.chunks.len());
    let mut skipped = 0usize;
    for chunk in &segmentation.chunks {
        match extract(chunk, grammar, &ctx) {
            Extraction::Candidate(candidate) => candidates.push(candidate),
            Extraction::Skip(reason) => {
                debug!(chunk = chunk.index, %reason, "row skipped");
                skipped += 1;
            }
        }
    }

    let Some(first) = candidates.first() else {
        return Err(ParseError::LedgerEmpty);
    };

    let mut notes = Vec::new();
    let mut running = match segmentation.opening_balance.or(header.opening_balance) {
        Some(opening) => opening,
        None => {
            notes.push(ReviewNote {
                row: 0,
                issue: LedgerIssue::OpeningBalanceInferred { date: first.date },
            });
            round_cents(first.balance - first.explicit_amount())
        }
    };

    let metadata = header.into_metadata(grammar, segmentation.opening_balance);

    let mut transactions = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        let outcome = reconcile(candidate, running);
        // filler rows: a reprinted balance with no movement
        if outcome.resolution == Resolution::BalanceDelta
            && within(outcome.amount, 0.0, BALANCE_EPSILON)
        {
            debug!(chunk = candidate.index, "zero-movement row skipped");
            skipped += 1;
            continue;
        }
        if outcome.resolution == Resolution::Unreconciled {
            notes.push(ReviewNote {
                row: transactions.len(),
                issue: LedgerIssue::Unreconciled {
                    date: candidate.date,
                    amount: outcome.amount,
                },
            });
        }
        running = outcome.balance;

        transactions.push(Transaction {
            date: candidate.date,
            description: sanitize(&candidate.description, grammar),
            amount: outcome.amount,
            balance: outcome.balance,
            account_id: metadata.account_id.clone(),
        });
    }

    let validation = validate_ledger(&transactions, &metadata, &notes)?;
    info!(
        bank = %grammar.bank(),
        transactions = transactions.len(),
        skipped,
        warnings = validation.warnings.len(),
        "statement parsed"
    );

    Ok(ParsedStatement {
        metadata,
        transactions,
        validation,
    })
}
