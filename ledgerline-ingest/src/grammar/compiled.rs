use ledgerline_core::dates::{MONTH_NAME_PATTERN, max_day_of_month, month_from_name};
use ledgerline_core::{Bank, ParseError};
use regex::{Captures, Regex};
use thiserror::Error;

use super::money::{MoneyToken, SignMarker};
use super::{Column, DateStyle, LayoutGrammar, MoneyFormat, SignConvention};

/// How far past a header label the amount it introduces may sit, in bytes.
const LABEL_WINDOW: usize = 40;

/// Longest money token `money_after` has to read past the window's end.
const MAX_TOKEN_BYTES: usize = 48;

#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("grammar {bank} declares no detection markers")]
    NoMarkers { bank: Bank },

    #[error("grammar {bank} has invalid columns: {reason}")]
    Columns { bank: Bank, reason: String },

    #[error("grammar {bank} uses its decimal separator as a thousands separator")]
    AmbiguousSeparators { bank: Bank },

    #[error("grammar {bank} has an invalid {field} pattern")]
    Pattern {
        bank: Bank,
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}

impl GrammarError {
    pub fn bank(&self) -> &Bank {
        match self {
            GrammarError::NoMarkers { bank }
            | GrammarError::Columns { bank, .. }
            | GrammarError::AmbiguousSeparators { bank }
            | GrammarError::Pattern { bank, .. } => bank,
        }
    }
}

impl From<GrammarError> for ParseError {
    fn from(err: GrammarError) -> Self {
        let reason = match &err {
            GrammarError::Pattern { field, source, .. } => format!("{field} pattern: {source}"),
            other => other.to_string(),
        };
        ParseError::InvalidGrammar {
            bank: err.bank().clone(),
            reason,
        }
    }
}

/// Day, month and (when printed) year read from one canonical date token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub day: u32,
    pub month: u32,
    pub year: Option<i32>,
}

#[derive(Debug, Clone)]
struct MetadataPatterns {
    account: Vec<Regex>,
    holder: Vec<Regex>,
    period: Vec<Regex>,
    opening: Vec<Regex>,
    closing: Vec<Regex>,
}

/// A validated grammar with every pattern built once.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    descriptor: LayoutGrammar,
    /// Index of the balance in `descriptor.columns`
    balance_at: usize,
    markers: Vec<String>,
    date_loose: Regex,
    date: Regex,
    anchor: Regex,
    money: Regex,
    merged_amount: Regex,
    section_start: Vec<Regex>,
    section_end: Vec<Regex>,
    opening: Option<Regex>,
    boilerplate: Option<Regex>,
    meta: MetadataPatterns,
}

impl CompiledGrammar {
    pub fn compile(descriptor: LayoutGrammar) -> Result<Self, GrammarError> {
        let bank = descriptor.bank.clone();

        let markers: Vec<String> = descriptor
            .markers
            .iter()
            .map(|m| fold_for_markers(m))
            .filter(|m| !m.is_empty())
            .collect();
        if markers.is_empty() {
            return Err(GrammarError::NoMarkers { bank });
        }

        let balance_at = check_columns(&descriptor.columns, descriptor.money.sign).map_err(
            |reason| GrammarError::Columns {
                bank: bank.clone(),
                reason: reason.to_string(),
            },
        )?;

        let decimal = descriptor.money.decimal.as_char();
        if descriptor
            .money
            .thousands
            .iter()
            .any(|t| t.as_char() == decimal)
        {
            return Err(GrammarError::AmbiguousSeparators { bank });
        }

        let build = |field: &'static str, pattern: &str| {
            Regex::new(pattern).map_err(|source| GrammarError::Pattern {
                bank: bank.clone(),
                field,
                source,
            })
        };
        let build_all = |field: &'static str, patterns: &[String], prefix: &str| {
            patterns
                .iter()
                .map(|p| build(field, &format!("{prefix}{p}")))
                .collect::<Result<Vec<_>, _>>()
        };

        let (loose, canonical) = date_patterns(descriptor.date_style);
        let anchor = if descriptor.line_based {
            format!("(?m)^(?:{canonical})")
        } else {
            canonical.clone()
        };
        let decimal_pattern = regex::escape(&decimal.to_string());

        let opening = match phrase_pattern(&descriptor.opening_markers) {
            Some(p) => Some(build("opening marker", &p)?),
            None => None,
        };
        let boilerplate = match phrase_pattern(&descriptor.boilerplate) {
            Some(p) => Some(build("boilerplate", &p)?),
            None => None,
        };

        let rules = &descriptor.metadata;
        let meta = MetadataPatterns {
            account: build_all("account", &rules.account, "")?,
            holder: build_all("holder", &rules.holder, "")?,
            period: build_all("period", &rules.period, "")?,
            opening: build_all("opening balance label", &rules.opening, "")?,
            closing: build_all("closing balance label", &rules.closing, "")?,
        };

        Ok(Self {
            balance_at,
            markers,
            date_loose: build("date", &loose)?,
            date: build("date", &canonical)?,
            anchor: build("date anchor", &anchor)?,
            money: build("money", &money_pattern(&descriptor.money))?,
            merged_amount: build(
                "merged amount",
                &format!(r"([0-9]{decimal_pattern}[0-9]{{2}})([0-9])"),
            )?,
            section_start: build_all("section start", &descriptor.section_start, "(?m)")?,
            section_end: build_all("section end", &descriptor.section_end, "(?m)")?,
            opening,
            boilerplate,
            meta,
            descriptor,
        })
    }

    pub fn descriptor(&self) -> &LayoutGrammar {
        &self.descriptor
    }

    pub fn bank(&self) -> &Bank {
        &self.descriptor.bank
    }

    pub fn currency(&self) -> &str {
        &self.descriptor.currency
    }

    pub fn line_based(&self) -> bool {
        self.descriptor.line_based
    }

    pub fn date_style(&self) -> DateStyle {
        self.descriptor.date_style
    }

    pub fn sign(&self) -> SignConvention {
        self.descriptor.money.sign
    }

    /// Money tokens a row carries up to and including its balance, capped
    /// at three.
    pub fn money_fields(&self) -> usize {
        (self.balance_at + 1).min(3)
    }

    /// Columns printed after the balance. Rows may leave them blank.
    pub fn trailing_fields(&self) -> usize {
        self.descriptor.columns.len() - self.balance_at - 1
    }

    /// `folded` must already be lowercased with whitespace collapsed.
    pub fn matches_markers(&self, folded: &str) -> bool {
        self.markers.iter().any(|m| folded.contains(m.as_str()))
    }

    pub(crate) fn date_loose(&self) -> &Regex {
        &self.date_loose
    }

    pub(crate) fn anchor(&self) -> &Regex {
        &self.anchor
    }

    pub(crate) fn merged_amount(&self) -> &Regex {
        &self.merged_amount
    }

    pub(crate) fn section_start(&self) -> &[Regex] {
        &self.section_start
    }

    pub(crate) fn section_end(&self) -> &[Regex] {
        &self.section_end
    }

    pub(crate) fn opening_marker(&self) -> Option<&Regex> {
        self.opening.as_ref()
    }

    pub(crate) fn boilerplate(&self) -> Option<&Regex> {
        self.boilerplate.as_ref()
    }

    pub(crate) fn account_patterns(&self) -> &[Regex] {
        &self.meta.account
    }

    pub(crate) fn holder_patterns(&self) -> &[Regex] {
        &self.meta.holder
    }

    pub(crate) fn period_patterns(&self) -> &[Regex] {
        &self.meta.period
    }

    pub(crate) fn opening_labels(&self) -> &[Regex] {
        &self.meta.opening
    }

    pub(crate) fn closing_labels(&self) -> &[Regex] {
        &self.meta.closing
    }

    /// All money tokens in `text`, left to right.
    pub fn scan_money(&self, text: &str) -> Vec<MoneyToken> {
        self.money
            .captures_iter(text)
            .filter_map(|caps| self.money_token(&caps))
            .collect()
    }

    /// First money token starting within a short window after `from`.
    ///
    /// Only a bounded slice past `from` is searched, so scanning every label
    /// occurrence in a document stays linear.
    pub fn money_after(&self, text: &str, from: usize) -> Option<MoneyToken> {
        let mut end = from
            .saturating_add(LABEL_WINDOW + MAX_TOKEN_BYTES)
            .min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let window = text.get(from..end)?;
        let token = self.money.captures_iter(window).find_map(|c| self.money_token(&c))?;
        (token.start <= LABEL_WINDOW).then(|| token.shifted(from))
    }

    fn money_token(&self, caps: &Captures) -> Option<MoneyToken> {
        let whole = caps.get(0)?;
        let num = caps.name("num")?.as_str();
        let decimal = self.descriptor.money.decimal.as_char();
        let cleaned: String = num
            .chars()
            .filter_map(|c| match c {
                '0'..='9' => Some(c),
                c if c == decimal => Some('.'),
                _ => None,
            })
            .collect();
        let magnitude: f64 = cleaned.parse().ok()?;

        let marker = if caps.name("lead").is_some() || caps.name("trail").is_some() {
            SignMarker::Negative
        } else {
            match caps.name("suffix") {
                Some(s) if s.as_str().eq_ignore_ascii_case("cr") => SignMarker::Positive,
                Some(_) => SignMarker::Negative,
                None => SignMarker::Unmarked,
            }
        };

        Some(MoneyToken {
            start: whole.start(),
            end: whole.end(),
            magnitude,
            marker,
        })
    }

    /// Read a canonical date token. Returns `None` for impossible dates.
    pub fn date_parts(&self, token: &str) -> Option<DateParts> {
        let caps = self.date.captures(token.trim())?;
        let day: u32 = caps.name("d")?.as_str().parse().ok()?;
        let m = caps.name("m")?.as_str();
        let month = m.parse::<u32>().ok().or_else(|| month_from_name(m))?;
        let year = caps.name("y").and_then(|y| y.as_str().parse().ok());

        if !(1..=12).contains(&month) || day == 0 || day > max_day_of_month(month) {
            return None;
        }
        Some(DateParts { day, month, year })
    }

    /// A date-shaped match is only a date if it is not the tail of a number
    /// and its day could exist.
    pub(crate) fn is_plausible_date(&self, text: &str, caps: &Captures) -> bool {
        let Some(whole) = caps.get(0) else {
            return false;
        };
        if text[..whole.start()].ends_with(['.', ',']) {
            return false;
        }
        caps.name("d")
            .and_then(|d| d.as_str().parse::<u32>().ok())
            .is_some_and(|d| (1..=31).contains(&d))
    }

    /// Canonical spelling of a loosely matched date.
    pub(crate) fn canonical_date(&self, caps: &Captures) -> String {
        let part = |name: &str| caps.name(name).map_or("", |m| m.as_str());
        match self.descriptor.date_style {
            DateStyle::DayMonthYear => format!("{}/{}/{}", part("d"), part("m"), part("y")),
            DateStyle::YearMonthDay => format!("{}/{}/{}", part("y"), part("m"), part("d")),
            DateStyle::DayMonthName => format!("{} {}", part("d"), part("m")),
            DateStyle::DayMonthNameYear => {
                format!("{} {} {}", part("d"), part("m"), part("y"))
            }
        }
    }
}

/// Lowercase and collapse whitespace, the form detection compares in.
pub(crate) fn fold_for_markers(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns the index of the balance column.
fn check_columns(columns: &[Column], sign: SignConvention) -> Result<usize, &'static str> {
    let balances = columns.iter().filter(|c| **c == Column::Balance).count();
    let at = match columns.iter().position(|c| *c == Column::Balance) {
        Some(at) if balances == 1 => at,
        _ => return Err("exactly one balance column is required"),
    };
    let (printed, trailing) = columns.split_at(at + 1);
    if printed.contains(&Column::AccruedCharges) {
        return Err("accrued charges are printed after the balance");
    }
    if trailing.iter().any(|c| *c != Column::AccruedCharges) {
        return Err("only accrued charges may follow the balance column");
    }
    // an unmarked trailing figure is told apart from a Cr/Dr balance
    if !trailing.is_empty() && sign != SignConvention::CreditDebitSuffix {
        return Err("columns after the balance need Cr/Dr marked balances");
    }
    Ok(at)
}

/// `(loose, canonical)` patterns with named groups `d`, `m` and `y`.
fn date_patterns(style: DateStyle) -> (String, String) {
    match style {
        DateStyle::DayMonthYear => (
            r"(?P<d>[0-9]{2})[./-](?P<m>[0-9]{2})[./-](?P<y>[0-9]{4})".to_string(),
            r"\b(?P<d>[0-9]{2})/(?P<m>[0-9]{2})/(?P<y>[0-9]{4})\b".to_string(),
        ),
        DateStyle::YearMonthDay => (
            r"(?P<y>[0-9]{4})[./-](?P<m>[0-9]{2})[./-](?P<d>[0-9]{2})".to_string(),
            r"\b(?P<y>[0-9]{4})/(?P<m>[0-9]{2})/(?P<d>[0-9]{2})\b".to_string(),
        ),
        DateStyle::DayMonthName => (
            format!(r"(?i)\b(?P<d>[0-9]{{1,2}}) ?(?P<m>{MONTH_NAME_PATTERN})\b"),
            format!(r"(?i)\b(?P<d>[0-9]{{1,2}}) (?P<m>{MONTH_NAME_PATTERN})\b"),
        ),
        DateStyle::DayMonthNameYear => (
            format!(
                r"(?i)\b(?P<d>[0-9]{{1,2}}) ?(?P<m>{MONTH_NAME_PATTERN}) (?P<y>[0-9]{{4}})\b"
            ),
            format!(
                r"(?i)\b(?P<d>[0-9]{{1,2}}) (?P<m>{MONTH_NAME_PATTERN}) (?P<y>[0-9]{{4}})\b"
            ),
        ),
    }
}

fn money_pattern(fmt: &MoneyFormat) -> String {
    let decimal = regex::escape(&fmt.decimal.as_char().to_string());
    let digits = if fmt.thousands.is_empty() {
        "[0-9]+".to_string()
    } else {
        let class: String = fmt
            .thousands
            .iter()
            .map(|t| regex::escape(&t.as_char().to_string()))
            .collect();
        format!(r"[0-9]{{1,3}}(?:[{class}][0-9]{{3}})+|[0-9]+")
    };

    let symbol = match fmt.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => {
            let boundary = if s.starts_with(char::is_alphanumeric) { r"\b" } else { "" };
            format!(r"(?:{boundary}{}\s?)?", regex::escape(s))
        }
        None => String::new(),
    };

    let suffix = match fmt.sign {
        SignConvention::Minus => r"\b(?P<trail>-)?",
        // suffix may sit flush against the digits (`150.00Cr`)
        SignConvention::CreditDebitSuffix => r"(?:\s?(?P<suffix>(?i:cr|dr))\b|\b)",
    };

    format!(r"(?P<lead>-\s?)?{symbol}\b(?P<num>(?:{digits}){decimal}[0-9]{{2}}){suffix}")
}

/// Case-insensitive alternation over literal phrases, tolerant of any
/// whitespace between words.
fn phrase_pattern(phrases: &[String]) -> Option<String> {
    let alternatives: Vec<String> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| {
            let body = p
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            if p.starts_with(char::is_alphanumeric) {
                format!(r"\b{body}")
            } else {
                body
            }
        })
        .collect();

    if alternatives.is_empty() {
        None
    } else {
        Some(format!("(?i)(?:{})", alternatives.join("|")))
    }
}
