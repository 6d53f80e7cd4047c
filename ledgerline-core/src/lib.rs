//! ledgerline-core: statement data model, error taxonomy and shared helpers

pub mod dates;
pub mod error;
pub mod money;
pub mod statement;

pub use error::{ParseError, Result};
pub use money::{BALANCE_EPSILON, MATCH_TOLERANCE, round_cents, within};
pub use statement::{
    Bank, LedgerValidation, ParsedStatement, StatementMetadata, StatementPeriod, Transaction,
    UNKNOWN_ACCOUNT,
};
