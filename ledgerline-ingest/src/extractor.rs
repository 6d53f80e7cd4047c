//! Field extraction: one raw chunk in, one dated candidate row out.

use chrono::NaiveDate;
use ledgerline_core::dates::{MONTH_NAME_PATTERN, resolve_year};
use ledgerline_core::{StatementPeriod, round_cents};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::grammar::{CompiledGrammar, DateParts, MoneyToken, SignMarker};
use crate::segmenter::RawChunk;

/// A row with its date resolved and its money tokens read, before the
/// balance walk decides the amount.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    pub index: usize,
    pub date: NaiveDate,
    pub description: String,
    /// Signed values of the non-balance tokens, in print order (0 to 2)
    pub amounts: Vec<f64>,
    pub balance: f64,
}

impl TransactionCandidate {
    /// Sum of the printed amount tokens; zero when the row prints none.
    pub fn explicit_amount(&self) -> f64 {
        round_cents(self.amounts.iter().sum())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoMoneyTokens,
    UnparseableDate,
    /// Year-less date on a statement that prints no year to take
    UnknownYear,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoMoneyTokens => f.write_str("no money tokens"),
            SkipReason::UnparseableDate => f.write_str("unparseable date"),
            SkipReason::UnknownYear => f.write_str("no year for year-less date"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Candidate(TransactionCandidate),
    Skip(SkipReason),
}

/// A year inside a full printed date (`14/01/2026`, `2026/01/14`,
/// `14 Jan 2026`), never the integer part of an amount.
fn dated_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let year = "(?:19|20)[0-9]{2}";
        let dmy = format!(r"[0-9]{{1,2}}/[0-9]{{1,2}}/(?P<dmy>{year})");
        let ymd = format!(r"(?P<ymd>{year})/[0-9]{{1,2}}/[0-9]{{1,2}}");
        let named = format!(r"[0-9]{{1,2}}\s+(?:{MONTH_NAME_PATTERN})\s+(?P<named>{year})");
        Regex::new(&format!(
            r"(?i)\b(?:{dmy}|{ymd}|{named})(?:$|[^0-9.,]|[.,](?:$|[^0-9]))"
        ))
        .expect("dated year regex")
    })
}

fn first_dated_year(text: &str) -> Option<i32> {
    let caps = dated_year_re().captures(text)?;
    ["dmy", "ymd", "named"]
        .into_iter()
        .find_map(|name| caps.name(name))
        .and_then(|m| m.as_str().parse().ok())
}

/// Where year-less row dates get their year from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateContext {
    period_end: Option<NaiveDate>,
    fallback_year: Option<i32>,
}

impl DateContext {
    /// Prefer the statement period; otherwise the year of the first full
    /// date printed anywhere in the text.
    pub fn new(period: Option<&StatementPeriod>, text: &str) -> Self {
        Self {
            period_end: period.map(|p| p.to),
            fallback_year: first_dated_year(text),
        }
    }

    /// True when year-less dates can be placed in a year.
    pub fn knows_year(&self) -> bool {
        self.period_end.is_some() || self.fallback_year.is_some()
    }

    pub fn resolve(&self, parts: DateParts) -> Option<NaiveDate> {
        match (parts.year, self.period_end) {
            (Some(year), _) => NaiveDate::from_ymd_opt(year, parts.month, parts.day),
            (None, Some(end)) => resolve_year(parts.month, parts.day, end),
            (None, None) => NaiveDate::from_ymd_opt(self.fallback_year?, parts.month, parts.day),
        }
    }
}

/// Unmarked figures printed after a Cr/Dr balance belong to the columns
/// that follow it. Returns how many of the last tokens to drop.
fn trailing_charges(tokens: &[MoneyToken], allowed: usize) -> usize {
    let unmarked = tokens
        .iter()
        .rev()
        .take(allowed)
        .take_while(|t| t.marker == SignMarker::Unmarked)
        .count();
    match tokens.len().checked_sub(unmarked + 1) {
        Some(i) if unmarked > 0 && tokens[i].marker != SignMarker::Unmarked => unmarked,
        _ => 0,
    }
}

/// Read the date and trailing money columns of one chunk.
///
/// Only the rightmost `money_fields` tokens belong to the numeric columns;
/// money-like text further left stays in the description. Figures in
/// columns printed after the balance are dropped.
pub fn extract(chunk: &RawChunk, grammar: &CompiledGrammar, ctx: &DateContext) -> Extraction {
    let Some(parts) = grammar.date_parts(&chunk.date_token) else {
        return Extraction::Skip(SkipReason::UnparseableDate);
    };
    if parts.year.is_none() && !ctx.knows_year() {
        return Extraction::Skip(SkipReason::UnknownYear);
    }
    let Some(date) = ctx.resolve(parts) else {
        return Extraction::Skip(SkipReason::UnparseableDate);
    };

    let mut tokens = grammar.scan_money(&chunk.body);
    let body_end = match trailing_charges(&tokens, grammar.trailing_fields()) {
        0 => chunk.body.len(),
        n => {
            let cut = tokens.len() - n;
            let end = tokens[cut].start;
            tokens.truncate(cut);
            end
        }
    };
    let keep = tokens.len().min(grammar.money_fields());
    let kept = &tokens[tokens.len() - keep..];
    let Some((balance, amounts)) = kept.split_last() else {
        return Extraction::Skip(SkipReason::NoMoneyTokens);
    };

    let mut description = String::with_capacity(chunk.body.len());
    let mut cursor = 0;
    for token in kept {
        description.push_str(&chunk.body[cursor..token.start]);
        description.push(' ');
        cursor = token.end;
    }
    description.push_str(&chunk.body[cursor..body_end]);

    Extraction::Candidate(TransactionCandidate {
        index: chunk.index,
        date,
        description: description.split_whitespace().collect::<Vec<_>>().join(" "),
        amounts: amounts
            .iter()
            .map(|t| round_cents(t.amount_value(grammar.sign())))
            .collect(),
        balance: round_cents(balance.balance_value()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarRegistry;
    use ledgerline_core::Bank;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn chunk(date: &str, body: &str) -> RawChunk {
        RawChunk {
            index: 0,
            date_token: date.to_string(),
            body: body.to_string(),
        }
    }

    fn candidate(extraction: Extraction) -> TransactionCandidate {
        match extraction {
            Extraction::Candidate(c) => c,
            Extraction::Skip(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_keeps_rightmost_tokens_only() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Nedbank).unwrap();
        let ctx = DateContext::new(None, "");
        let c = candidate(extract(
            &chunk("02/01/2026", "Refund of 12.00 order 5.00 -120.00 300.00 1,180.00"),
            g,
            &ctx,
        ));
        assert_eq!(c.date, ymd(2026, 1, 2));
        assert_eq!(c.amounts, vec![-120.0, 300.0]);
        assert_eq!(c.balance, 1180.0);
        assert_eq!(c.description, "Refund of 12.00 order 5.00");
    }

    #[test]
    fn test_credit_debit_suffix_values() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Fnb).unwrap();
        let ctx = DateContext::new(None, "Statement date 14 Jan 2026");
        let c = candidate(extract(&chunk("3 Jan", "POS Purchase 50.00 2,900.00 Cr"), g, &ctx));
        assert_eq!(c.amounts, vec![-50.0]);
        assert_eq!(c.balance, 2900.0);
        assert_eq!(c.description, "POS Purchase");
        assert_eq!(c.date, ymd(2026, 1, 3));
    }

    #[test]
    fn test_no_money_tokens_skips() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Nedbank).unwrap();
        let ctx = DateContext::new(None, "");
        assert_eq!(
            extract(&chunk("02/01/2026", "Page 2 of 3"), g, &ctx),
            Extraction::Skip(SkipReason::NoMoneyTokens)
        );
    }

    #[test]
    fn test_impossible_date_skips() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Nedbank).unwrap();
        let ctx = DateContext::new(None, "");
        assert_eq!(
            extract(&chunk("31/02/2026", "Fee 5.00 100.00"), g, &ctx),
            Extraction::Skip(SkipReason::UnparseableDate)
        );
    }

    #[test]
    fn test_year_rollover_from_period() {
        let period = StatementPeriod {
            from: ymd(2025, 12, 15),
            to: ymd(2026, 1, 14),
        };
        let ctx = DateContext::new(Some(&period), "");
        let dec = DateParts {
            day: 20,
            month: 12,
            year: None,
        };
        let jan = DateParts {
            day: 3,
            month: 1,
            year: None,
        };
        assert_eq!(ctx.resolve(dec), Some(ymd(2025, 12, 20)));
        assert_eq!(ctx.resolve(jan), Some(ymd(2026, 1, 3)));
    }

    #[test]
    fn test_accrued_charge_after_balance_is_dropped() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Fnb).unwrap();
        let ctx = DateContext::new(None, "Statement date 14 Jan 2026");
        let c = candidate(extract(
            &chunk("5 Jan", "Cash Withdrawal 100.00 850.00 Cr 12.50"),
            g,
            &ctx,
        ));
        assert_eq!(c.amounts, vec![-100.0]);
        assert_eq!(c.balance, 850.0);
        assert_eq!(c.description, "Cash Withdrawal");

        // no charge printed: the Cr balance stays last
        let c = candidate(extract(&chunk("6 Jan", "Deposit 100.00Cr 950.00 Cr"), g, &ctx));
        assert_eq!(c.amounts, vec![100.0]);
        assert_eq!(c.balance, 950.0);
    }

    #[test]
    fn test_fallback_year_ignores_amounts() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Fnb).unwrap();
        let jan_3 = chunk("3 Jan", "Salary 2015.50Cr 3,015.50Cr");

        let ctx = DateContext::new(None, "Salary 2015.50Cr 3,015.50Cr");
        assert!(!ctx.knows_year());
        assert_eq!(
            extract(&jan_3, g, &ctx),
            Extraction::Skip(SkipReason::UnknownYear)
        );

        let ctx = DateContext::new(None, "Salary 2015.50Cr Printed 2026/01/14");
        assert_eq!(candidate(extract(&jan_3, g, &ctx)).date, ymd(2026, 1, 3));

        let ctx = DateContext::new(None, "Fee 12.50 2015.00 issued 14/01/2026");
        assert_eq!(candidate(extract(&jan_3, g, &ctx)).date, ymd(2026, 1, 3));
    }

    #[test]
    fn test_explicit_amount() {
        let c = TransactionCandidate {
            index: 0,
            date: ymd(2026, 1, 1),
            description: String::new(),
            amounts: vec![-120.0, -5.0],
            balance: 875.0,
        };
        assert_eq!(c.explicit_amount(), -125.0);
    }
}
