//! ledgerline-ingest: grammar-driven reconstruction of bank statement text
//! into a balance-checked ledger.

pub mod detector;
pub mod engine;
pub mod extractor;
pub mod grammar;
pub mod metadata;
pub mod normalizer;
pub mod reconciler;
pub mod sanitizer;
pub mod segmenter;
pub mod validator;

pub use engine::{StatementParser, parse_with_grammar};
pub use grammar::{CompiledGrammar, GrammarError, GrammarRegistry, LayoutGrammar};
