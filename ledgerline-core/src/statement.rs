//! Statement record types shared by the engine and its callers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account identifier used when a statement header carries none.
pub const UNKNOWN_ACCOUNT: &str = "unknown";

/// Statement layout family a grammar was written for.
///
/// Serialized as a plain lowercase id (`"capitec"`, `"fnb"`, ...). Ids that do
/// not name a built-in format become [`Bank::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bank {
    Absa,
    Capitec,
    Fnb,
    Nedbank,
    Custom(String),
}

impl Bank {
    pub fn id(&self) -> &str {
        match self {
            Bank::Absa => "absa",
            Bank::Capitec => "capitec",
            Bank::Fnb => "fnb",
            Bank::Nedbank => "nedbank",
            Bank::Custom(id) => id,
        }
    }

    /// Human-readable name for report headers
    pub fn display_name(&self) -> &str {
        match self {
            Bank::Absa => "ABSA",
            Bank::Capitec => "Capitec",
            Bank::Fnb => "FNB",
            Bank::Nedbank => "Nedbank",
            Bank::Custom(id) => id,
        }
    }
}

impl From<String> for Bank {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "absa" => Bank::Absa,
            "capitec" => Bank::Capitec,
            "fnb" | "first-national-bank" => Bank::Fnb,
            "nedbank" => Bank::Nedbank,
            _ => Bank::Custom(s.trim().to_lowercase()),
        }
    }
}

impl From<Bank> for String {
    fn from(bank: Bank) -> Self {
        bank.id().to_string()
    }
}

impl FromStr for Bank {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Bank::from(s.to_string()))
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Inclusive statement period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Header-level facts about one statement. Built once per parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementMetadata {
    pub bank: Bank,
    pub account_id: String,
    pub account_holder: Option<String>,
    pub period: Option<StatementPeriod>,
    /// Opening balance as declared by the document (header or brought-forward row)
    pub opening_balance: Option<f64>,
    /// Closing balance as declared by the document header
    pub closing_balance: Option<f64>,
    /// ISO 4217 code
    pub currency: String,
}

/// A reconstructed ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    /// Positive = credit/inflow, negative = debit/outflow
    pub amount: f64,
    /// Running balance after this transaction
    pub balance: f64,
    pub account_id: String,
}

impl Transaction {
    /// Returns true for outflows (negative amount)
    pub fn is_debit(&self) -> bool {
        self.amount < 0.0
    }

    /// Returns true for inflows (positive amount)
    pub fn is_credit(&self) -> bool {
        self.amount > 0.0
    }
}

/// Outcome of the end-to-end continuity check. Divergence is reported here,
/// never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
}

impl LedgerValidation {
    pub fn from_warnings(warnings: Vec<String>) -> Self {
        Self {
            valid: warnings.is_empty(),
            warnings,
        }
    }
}

/// Everything one parse run hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub metadata: StatementMetadata,
    pub transactions: Vec<Transaction>,
    pub validation: LedgerValidation,
}
