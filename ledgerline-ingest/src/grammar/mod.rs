//! Layout grammars: one declarative descriptor per statement format.
//!
//! A [`LayoutGrammar`] is plain data (serde, loadable from TOML). It is
//! compiled once into a [`CompiledGrammar`] holding the regexes every pipeline
//! stage needs. Adding a format means adding a descriptor, never a new parser.

mod builtin;
mod compiled;
mod money;
mod registry;

pub use builtin::builtin_grammars;
pub(crate) use compiled::fold_for_markers;
pub use compiled::{CompiledGrammar, DateParts, GrammarError};
pub use money::{MoneyToken, SignMarker};
pub use registry::GrammarRegistry;

use ledgerline_core::Bank;
use serde::{Deserialize, Serialize};

/// Declarative description of one statement layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutGrammar {
    pub bank: Bank,
    /// Case-insensitive literals; any one of them identifies the format.
    pub markers: Vec<String>,
    pub date_style: DateStyle,
    #[serde(default)]
    pub money: MoneyFormat,
    /// Trailing numeric columns in print order. Exactly one `balance`; only
    /// `accrued_charges` may be printed after it.
    #[serde(default = "default_columns")]
    pub columns: Vec<Column>,
    /// Regexes; the transaction section starts after the earliest match.
    #[serde(default)]
    pub section_start: Vec<String>,
    /// Regexes; the transaction section ends at the earliest match.
    #[serde(default)]
    pub section_end: Vec<String>,
    /// Phrases marking the balance brought forward row.
    #[serde(default)]
    pub opening_markers: Vec<String>,
    /// Phrases at which a description is cut off.
    #[serde(default)]
    pub boilerplate: Vec<String>,
    /// Rows start at line starts; keep line breaks through normalization.
    #[serde(default)]
    pub line_based: bool,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub metadata: MetadataRules,
}

fn default_columns() -> Vec<Column> {
    vec![Column::Amount, Column::Balance]
}

fn default_currency() -> String {
    "ZAR".to_string()
}

/// How row dates are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// `31/01/2026` (also `-` or `.` separated)
    DayMonthYear,
    /// `2026/01/31`
    YearMonthDay,
    /// `31 Jan`, year taken from the statement period
    DayMonthName,
    /// `31 Jan 2026`
    DayMonthNameYear,
}

impl DateStyle {
    /// Styles whose day is printed without zero padding, which is what lets
    /// extraction split a two-digit day across a token boundary.
    pub fn has_variable_day(self) -> bool {
        matches!(self, DateStyle::DayMonthName | DateStyle::DayMonthNameYear)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalSeparator {
    #[default]
    Dot,
    Comma,
}

impl DecimalSeparator {
    pub fn as_char(self) -> char {
        match self {
            DecimalSeparator::Dot => '.',
            DecimalSeparator::Comma => ',',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThousandsSeparator {
    Comma,
    Space,
    Dot,
    Apostrophe,
}

impl ThousandsSeparator {
    pub fn as_char(self) -> char {
        match self {
            ThousandsSeparator::Comma => ',',
            ThousandsSeparator::Space => ' ',
            ThousandsSeparator::Dot => '.',
            ThousandsSeparator::Apostrophe => '\'',
        }
    }
}

/// How a printed amount says which way money moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Leading or trailing `-` marks a debit; unmarked amounts are credits.
    #[default]
    Minus,
    /// `Cr` marks a credit, `Dr` a debit; unmarked amounts are debits and
    /// unmarked balances are positive.
    CreditDebitSuffix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyFormat {
    #[serde(default)]
    pub decimal: DecimalSeparator,
    #[serde(default)]
    pub thousands: Vec<ThousandsSeparator>,
    #[serde(default)]
    pub sign: SignConvention,
    /// Optional currency symbol printed before amounts (`R`, `$`)
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            decimal: DecimalSeparator::Dot,
            thousands: vec![ThousandsSeparator::Comma],
            sign: SignConvention::Minus,
            symbol: None,
        }
    }
}

/// Trailing numeric column kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Amount,
    MoneyIn,
    MoneyOut,
    Fee,
    Balance,
    /// Unmarked figure some rows print after a Cr/Dr balance. Not part of
    /// the ledger; only valid after `balance` with the Cr/Dr convention.
    AccruedCharges,
}

/// Header scanning rules. Every field is a list of regexes tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataRules {
    /// Capture 1 is the account number
    #[serde(default)]
    pub account: Vec<String>,
    /// Capture 1 is the holder name
    #[serde(default)]
    pub holder: Vec<String>,
    /// Captures 1 and 2 are the period start and end dates
    #[serde(default)]
    pub period: Vec<String>,
    /// Label preceding the declared opening balance
    #[serde(default)]
    pub opening: Vec<String>,
    /// Label preceding the declared closing balance
    #[serde(default)]
    pub closing: Vec<String>,
}
