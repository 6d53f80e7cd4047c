//! Splits the transaction section of a normalized statement into one raw
//! chunk per printed row. A row starts at a date token and runs to the next.

use ledgerline_core::dates::max_day_of_month;
use ledgerline_core::{ParseError, Result};
use tracing::debug;

use crate::grammar::CompiledGrammar;

/// Text of one printed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Position in the emitted row stream
    pub index: usize,
    /// Canonical date token that opened the row
    pub date_token: String,
    /// Everything after the date token up to the next row, on one line
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Balance carried into the statement, when the section prints one
    pub opening_balance: Option<f64>,
    pub chunks: Vec<RawChunk>,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    start: usize,
    end: usize,
    /// Start of a day digit moved back onto this date token
    repaired_from: Option<usize>,
}

pub fn segment(normalized: &str, grammar: &CompiledGrammar) -> Result<Segmentation> {
    let section = locate_section(normalized, grammar)?;
    if section.trim().is_empty() {
        return Err(ParseError::TransactionSectionEmpty);
    }

    let mut anchors: Vec<Anchor> = grammar
        .anchor()
        .captures_iter(section)
        .filter(|caps| grammar.is_plausible_date(section, caps))
        .filter_map(|caps| caps.get(0))
        .map(|m| Anchor {
            start: m.start(),
            end: m.end(),
            repaired_from: None,
        })
        .collect();

    if grammar.date_style().has_variable_day() {
        repair_split_days(section, grammar, &mut anchors);
    }

    let first_start = anchors
        .first()
        .map_or(section.len(), |a| a.repaired_from.unwrap_or(a.start));
    let preamble_seed = opening_after_marker(&section[..first_start], grammar);

    let mut chunks = Vec::with_capacity(anchors.len());
    let mut row_seed = None;
    for (i, anchor) in anchors.iter().enumerate() {
        let next = anchors
            .get(i + 1)
            .map_or(section.len(), |a| a.repaired_from.unwrap_or(a.start));
        let date_token = match anchor.repaired_from {
            Some(digit) => format!(
                "{}{}",
                &section[digit..digit + 1],
                &section[anchor.start..anchor.end]
            ),
            None => section[anchor.start..anchor.end].to_string(),
        };
        let body = section[anchor.end..next].replace('\n', " ").trim().to_string();

        if is_opening_row(&body, grammar) {
            if row_seed.is_none() {
                row_seed = grammar.scan_money(&body).last().map(|t| t.balance_value());
            }
            continue;
        }

        chunks.push(RawChunk {
            index: chunks.len(),
            date_token,
            body,
        });
    }

    debug!(
        bank = %grammar.bank(),
        rows = chunks.len(),
        anchors = anchors.len(),
        "statement segmented"
    );

    Ok(Segmentation {
        opening_balance: row_seed.or(preamble_seed),
        chunks,
    })
}

/// Cut the text down to the transaction section declared by the grammar.
fn locate_section<'t>(text: &'t str, grammar: &CompiledGrammar) -> Result<&'t str> {
    let start = if grammar.section_start().is_empty() {
        0
    } else {
        grammar
            .section_start()
            .iter()
            .filter_map(|re| re.find(text))
            .min_by_key(|m| m.start())
            .map(|m| m.end())
            .ok_or_else(|| ParseError::TransactionSectionNotFound("start marker missing".into()))?
    };

    let end = if grammar.section_end().is_empty() {
        text.len()
    } else {
        let rest = &text[start..];
        let offset = grammar
            .section_end()
            .iter()
            .filter_map(|re| re.find(rest))
            .map(|m| m.start())
            .min()
            .ok_or_else(|| ParseError::TransactionSectionNotFound("end marker missing".into()))?;
        start + offset
    };

    Ok(&text[start..end])
}

fn is_opening_row(body: &str, grammar: &CompiledGrammar) -> bool {
    grammar.opening_marker().is_some_and(|re| re.is_match(body))
}

fn opening_after_marker(text: &str, grammar: &CompiledGrammar) -> Option<f64> {
    let marker = grammar.opening_marker()?.find(text)?;
    grammar
        .money_after(text, marker.end())
        .map(|t| t.balance_value())
}

/// `... 1 5 Jan` where the extractor lost the space-free `15 Jan`: pull a
/// standalone leading digit back onto a single-digit day.
fn repair_split_days(section: &str, grammar: &CompiledGrammar, anchors: &mut [Anchor]) {
    let mut floor = 0;
    for anchor in anchors.iter_mut() {
        let lower = floor;
        floor = anchor.end;

        let token = &section[anchor.start..anchor.end];
        let Some(parts) = grammar.date_parts(token) else {
            continue;
        };
        if token.split_whitespace().next().is_none_or(|day| day.len() != 1) {
            continue;
        }

        let before = section[lower..anchor.start].trim_end();
        let Some(last) = before.split_whitespace().next_back() else {
            continue;
        };
        let Some(tens) = single_day_digit(last) else {
            continue;
        };
        if tens * 10 + parts.day > max_day_of_month(parts.month) {
            continue;
        }
        anchor.repaired_from = Some(lower + before.len() - 1);
    }
}

fn single_day_digit(token: &str) -> Option<u32> {
    match token {
        "1" => Some(1),
        "2" => Some(2),
        "3" => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{
        Column, DateStyle, GrammarRegistry, LayoutGrammar, MetadataRules, MoneyFormat,
    };
    use crate::normalizer::normalize;
    use ledgerline_core::Bank;

    fn simple(section_start: &[&str], section_end: &[&str]) -> CompiledGrammar {
        CompiledGrammar::compile(LayoutGrammar {
            bank: Bank::Custom("simple".to_string()),
            markers: vec!["simple bank".to_string()],
            date_style: DateStyle::DayMonthYear,
            money: MoneyFormat::default(),
            columns: vec![Column::Amount, Column::Balance],
            section_start: section_start.iter().map(|s| s.to_string()).collect(),
            section_end: section_end.iter().map(|s| s.to_string()).collect(),
            opening_markers: vec!["Opening Balance".to_string()],
            boilerplate: vec![],
            line_based: false,
            currency: "ZAR".to_string(),
            metadata: MetadataRules::default(),
        })
        .unwrap()
    }

    fn run(text: &str, grammar: &CompiledGrammar) -> Result<Segmentation> {
        segment(&normalize(text, grammar), grammar)
    }

    #[test]
    fn test_chunks_and_opening_row() {
        let g = simple(&[], &[]);
        let seg = run(
            "01/01/2026 Opening Balance 1000.00 02/01/2026 Coffee Shop 50.00 950.00 03/01/2026 Salary 2000.00 2950.00",
            &g,
        )
        .unwrap();
        assert_eq!(seg.opening_balance, Some(1000.0));
        assert_eq!(seg.chunks.len(), 2);
        assert_eq!(seg.chunks[0].date_token, "02/01/2026");
        assert_eq!(seg.chunks[0].body, "Coffee Shop 50.00 950.00");
        assert_eq!(seg.chunks[1].index, 1);
    }

    #[test]
    fn test_preamble_opening_seed() {
        let g = simple(&[], &[]);
        let seg = run("Opening Balance 500.00 02/01/2026 Fee 5.00- 495.00", &g).unwrap();
        assert_eq!(seg.opening_balance, Some(500.0));
        assert_eq!(seg.chunks.len(), 1);
    }

    #[test]
    fn test_section_markers() {
        let g = simple(&["Transactions"], &["Closing Balance"]);
        let seg = run(
            "Summary 01/12/2025 Transactions 02/01/2026 Fee 5.00- 495.00 Closing Balance 495.00 09/01/2026",
            &g,
        )
        .unwrap();
        assert_eq!(seg.chunks.len(), 1);
        assert_eq!(seg.chunks[0].body, "Fee 5.00- 495.00");
    }

    #[test]
    fn test_missing_markers_are_fatal() {
        let g = simple(&["Transactions"], &["Closing Balance"]);
        let err = run("Transactions 02/01/2026 Fee 5.00- 495.00", &g).unwrap_err();
        assert_eq!(err.code(), "TRANSACTION_SECTION_NOT_FOUND");

        let err = run("Closing Balance 02/01/2026 Fee 5.00- 495.00", &g).unwrap_err();
        assert_eq!(err.code(), "TRANSACTION_SECTION_NOT_FOUND");
    }

    #[test]
    fn test_empty_section() {
        let g = simple(&["Transactions"], &["Closing Balance"]);
        let err = run("Transactions Closing Balance 0.00", &g).unwrap_err();
        assert_eq!(err, ParseError::TransactionSectionEmpty);
    }

    #[test]
    fn test_line_based_continuation_lines() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Nedbank).unwrap();
        let text = "Nedbank\n01/02/2026 Card purchase\nWOOLWORTHS 02/01 CAPE TOWN\n120.00 880.00\n02/02/2026 Fee 5.00 875.00";
        let seg = run(text, g).unwrap();
        assert_eq!(seg.chunks.len(), 2);
        assert_eq!(
            seg.chunks[0].body,
            "Card purchase WOOLWORTHS 02/01 CAPE TOWN 120.00 880.00"
        );
    }

    #[test]
    fn test_split_day_repair() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Fnb).unwrap();
        let text = "Transactions in RAND 2 Jan Salary 2,000.00Cr 2,950.00Cr 1 5 Jan Coffee 50.00 2,900.00Cr Closing Balance";
        let seg = run(text, g).unwrap();
        assert_eq!(seg.chunks.len(), 2);
        assert_eq!(seg.chunks[1].date_token, "15 Jan");
        assert_eq!(seg.chunks[0].body, "Salary 2,000.00 Cr 2,950.00 Cr");
    }

    #[test]
    fn test_split_day_repair_respects_month_length() {
        let registry = GrammarRegistry::builtin();
        let g = registry.get(&Bank::Fnb).unwrap();
        let text = "Transactions in RAND 2 Feb Salary 2,000.00Cr 2,950.00Cr 3 5 Feb Coffee 50.00 2,900.00Cr Closing Balance";
        let seg = run(text, g).unwrap();
        assert_eq!(seg.chunks[1].date_token, "5 Feb");
    }
}
