//! Text normalization ahead of segmentation.
//!
//! PDF text extraction mashes tokens together: letters run into amounts,
//! adjacent amounts lose the space between them and dates come out with
//! whatever separator the layout used. Every step here only inserts or
//! collapses whitespace (or rewrites date separators), so running the whole
//! pass twice gives the same text as running it once.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::grammar::CompiledGrammar;

fn letter_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\p{L})([0-9])").expect("letter digit regex"))
}

fn digit_letter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9])(\p{L})").expect("digit letter regex"))
}

/// Normalize raw statement text for the given grammar.
pub fn normalize(raw: &str, grammar: &CompiledGrammar) -> String {
    let line_based = grammar.line_based();
    let text = tidy(raw, line_based);
    let text = split_letter_digit(&text);
    // dates go before the merged-amount split, which would cut `31.01.2026`
    let text = isolate_dates(&text, grammar);
    let text = split_merged_amounts(&text, grammar);
    tidy(&text, line_based)
}

/// Collapse whitespace. Line-based text keeps its line breaks but loses
/// blank lines and per-line padding.
fn tidy(text: &str, line_based: bool) -> String {
    if line_based {
        text.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn split_letter_digit(text: &str) -> String {
    let text = letter_digit_re().replace_all(text, "${1} ${2}");
    digit_letter_re()
        .replace_all(&text, "${1} ${2}")
        .into_owned()
}

fn isolate_dates(text: &str, grammar: &CompiledGrammar) -> String {
    grammar
        .date_loose()
        .replace_all(text, |caps: &Captures| {
            if grammar.is_plausible_date(text, caps) {
                format!(" {} ", grammar.canonical_date(caps))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// `5.5078.20` becomes `5.50 78.20`. Repeated until nothing changes because
/// one pass can leave a fresh match behind.
fn split_merged_amounts(text: &str, grammar: &CompiledGrammar) -> String {
    let mut current = text.to_string();
    loop {
        match grammar.merged_amount().replace_all(&current, "${1} ${2}") {
            Cow::Borrowed(_) => return current,
            Cow::Owned(next) => current = next,
        }
    }
}
