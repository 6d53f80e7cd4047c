//! Calendar helpers: month names in the statement languages we read
//! (English and Afrikaans) and a loose header-date parser.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Regex alternation over every month spelling `month_from_name` accepts.
/// Longer spellings come first so leftmost-first matching takes the full word.
pub const MONTH_NAME_PATTERN: &str = concat!(
    "Januarie|January|Jan|Februarie|February|Feb|Maart|March|Mrt|Mar|April|Apr|",
    "Mei|May|Junie|June|Jun|Julie|July|Jul|Augustus|August|Aug|",
    "September|Sept|Sep|Oktober|October|Okt|Oct|November|Nov|",
    "Desember|December|Des|Dec"
);

/// Month number for an English or Afrikaans month name or abbreviation.
pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.trim().trim_end_matches('.').to_lowercase().as_str() {
        "jan" | "january" | "januarie" => 1,
        "feb" | "february" | "februarie" => 2,
        "mar" | "mrt" | "march" | "maart" => 3,
        "apr" | "april" => 4,
        "may" | "mei" => 5,
        "jun" | "june" | "junie" => 6,
        "jul" | "july" | "julie" => 7,
        "aug" | "august" | "augustus" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "okt" | "october" | "oktober" => 10,
        "nov" | "november" => 11,
        "dec" | "des" | "december" | "desember" => 12,
        _ => return None,
    };
    Some(month)
}

/// Largest day-of-month the month can have in any year.
pub fn max_day_of_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Resolve a year-less day/month against a statement period. Dates that would
/// land after the period end belong to the previous year (December rows on a
/// statement closing in January).
pub fn resolve_year(month: u32, day: u32, period_end: NaiveDate) -> Option<NaiveDate> {
    let year = period_end.year();
    let candidate = NaiveDate::from_ymd_opt(year, month, day)?;
    if candidate > period_end {
        NaiveDate::from_ymd_opt(year - 1, month, day)
    } else {
        Some(candidate)
    }
}

fn named_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})\s+([A-Za-z]+)\.?,?\s+(\d{4})$").expect("named date regex")
    })
}

/// Parse a header date in any of the layouts statements print:
/// `31/01/2026`, `2026/01/31`, `31-01-2026`, `2026-01-31`, `31.01.2026`,
/// `31 Jan 2026`, `31 Januarie 2026`.
pub fn parse_date_loose(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in ["%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%Y-%m-%d", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let caps = named_date_re().captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_from_name(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
