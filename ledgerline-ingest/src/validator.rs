//! End-to-end continuity check over the reconstructed ledger.

use chrono::NaiveDate;
use ledgerline_core::{
    BALANCE_EPSILON, LedgerValidation, ParseError, Result, StatementMetadata, Transaction,
    round_cents, within,
};
use thiserror::Error;
use tracing::debug;

/// Non-fatal findings. Rendered into the validation warnings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerIssue {
    #[error("Balance mismatch on {date}: expected {expected:.2}, got {actual:.2}")]
    BalanceMismatch {
        date: NaiveDate,
        expected: f64,
        actual: f64,
    },

    #[error("Opening balance mismatch on {date}: expected {expected:.2}, got {actual:.2}")]
    OpeningBalanceMismatch {
        date: NaiveDate,
        expected: f64,
        actual: f64,
    },

    #[error("Closing balance mismatch: statement declares {declared:.2}, ledger ends at {actual:.2}")]
    ClosingBalanceMismatch { declared: f64, actual: f64 },

    #[error("Unreconciled amount on {date}: printed amounts do not match the balance change, used {amount:.2}")]
    Unreconciled { date: NaiveDate, amount: f64 },

    #[error("Opening balance not found; inferred from first row on {date}")]
    OpeningBalanceInferred { date: NaiveDate },
}

/// An issue raised while building the ledger, pinned to a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewNote {
    pub row: usize,
    pub issue: LedgerIssue,
}

/// `Some((expected, actual))` when `previous + amount` misses the row balance.
fn continuity(previous: f64, txn: &Transaction) -> Option<(f64, f64)> {
    let expected = round_cents(previous + txn.amount);
    (!within(expected, txn.balance, BALANCE_EPSILON)).then_some((expected, txn.balance))
}

pub fn validate_ledger(
    transactions: &[Transaction],
    metadata: &StatementMetadata,
    notes: &[ReviewNote],
) -> Result<LedgerValidation> {
    let Some(last) = transactions.last() else {
        return Err(ParseError::LedgerEmpty);
    };

    let mut warnings = Vec::new();
    let mut previous: Option<f64> = None;
    for (row, txn) in transactions.iter().enumerate() {
        warnings.extend(
            notes
                .iter()
                .filter(|n| n.row == row)
                .map(|n| n.issue.to_string()),
        );

        let issue = match previous {
            Some(prev) => continuity(prev, txn).map(|(expected, actual)| {
                LedgerIssue::BalanceMismatch {
                    date: txn.date,
                    expected,
                    actual,
                }
            }),
            None => metadata
                .opening_balance
                .and_then(|opening| continuity(opening, txn))
                .map(|(expected, actual)| LedgerIssue::OpeningBalanceMismatch {
                    date: txn.date,
                    expected,
                    actual,
                }),
        };
        if let Some(issue) = issue {
            warnings.push(issue.to_string());
        }
        previous = Some(txn.balance);
    }

    if let Some(declared) = metadata.closing_balance {
        if !within(last.balance, declared, BALANCE_EPSILON) {
            warnings.push(
                LedgerIssue::ClosingBalanceMismatch {
                    declared,
                    actual: last.balance,
                }
                .to_string(),
            );
        }
    }

    debug!(
        rows = transactions.len(),
        warnings = warnings.len(),
        "ledger validated"
    );
    Ok(LedgerValidation::from_warnings(warnings))
}
