//! Balance-driven amount resolution.
//!
//! The running balance column is the most reliably extracted figure on a
//! statement, so the difference between consecutive balances is the ground
//! truth a row's printed amount tokens are checked against.

use ledgerline_core::{MATCH_TOLERANCE, round_cents, within};

use crate::extractor::TransactionCandidate;

/// How a row's amount was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No amount token; the balance delta is the amount.
    BalanceDelta,
    /// The single amount token agreed with the balance delta.
    ExplicitAmount,
    /// The single amount token disagreed; the balance delta wins.
    Overridden,
    /// A signed combination of two tokens agreed with the balance delta.
    Combined,
    /// Two tokens and no combination agreed; the balance delta is used and
    /// the row needs review.
    Unreconciled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    pub amount: f64,
    /// Balance after the row; the caller threads it into the next call.
    pub balance: f64,
    pub resolution: Resolution,
}

/// Sign pairs tried against two tokens, in tie-break order.
const COMBINATIONS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, -1.0),
    (-1.0, 1.0),
];

pub fn reconcile(candidate: &TransactionCandidate, running: f64) -> Reconciliation {
    let balance = candidate.balance;
    let expected = round_cents(balance - running);

    let (amount, resolution) = match candidate.amounts.as_slice() {
        [] => (expected, Resolution::BalanceDelta),
        [single] => {
            if within(single.abs(), expected.abs(), MATCH_TOLERANCE) {
                (
                    round_cents(single.abs().copysign(expected)),
                    Resolution::ExplicitAmount,
                )
            } else {
                (expected, Resolution::Overridden)
            }
        }
        [a, b, ..] => match closest_combination(*a, *b, expected) {
            Some(value) => (value, Resolution::Combined),
            None => (expected, Resolution::Unreconciled),
        },
    };

    Reconciliation {
        amount,
        balance,
        resolution,
    }
}

fn closest_combination(a: f64, b: f64, expected: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for (sa, sb) in COMBINATIONS {
        let value = round_cents(sa * a.abs() + sb * b.abs());
        if !within(value, expected, MATCH_TOLERANCE) {
            continue;
        }
        let diff = (value - expected).abs();
        if best.is_none_or(|(best_diff, _)| diff < best_diff) {
            best = Some((diff, value));
        }
    }
    best.map(|(_, value)| value)
}
