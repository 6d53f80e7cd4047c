use thiserror::Error;

use crate::statement::Bank;

/// Fatal parse failures. Each aborts the run with no partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("statement format not recognized")]
    FormatNotRecognized,

    #[error("no layout grammar registered for format: {0}")]
    UnsupportedFormat(Bank),

    #[error("transaction section not found: {0}")]
    TransactionSectionNotFound(String),

    #[error("transaction section is empty")]
    TransactionSectionEmpty,

    #[error("no transactions could be reconstructed")]
    LedgerEmpty,

    #[error("invalid layout grammar for {bank}: {reason}")]
    InvalidGrammar { bank: Bank, reason: String },
}

impl ParseError {
    /// Stable machine-readable code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::FormatNotRecognized => "FORMAT_NOT_RECOGNIZED",
            ParseError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ParseError::TransactionSectionNotFound(_) => "TRANSACTION_SECTION_NOT_FOUND",
            ParseError::TransactionSectionEmpty => "TRANSACTION_SECTION_EMPTY",
            ParseError::LedgerEmpty => "LEDGER_EMPTY",
            ParseError::InvalidGrammar { .. } => "INVALID_GRAMMAR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
