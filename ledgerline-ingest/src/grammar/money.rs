use super::SignConvention;

/// Explicit direction printed next to an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMarker {
    /// Leading/trailing minus, or a `Dr` suffix
    Negative,
    /// A `Cr` suffix
    Positive,
    Unmarked,
}

/// One money-like token found in a text, with its byte span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoneyToken {
    pub start: usize,
    pub end: usize,
    pub magnitude: f64,
    pub marker: SignMarker,
}

impl MoneyToken {
    /// Value read as a running balance. Only an explicit negative marker
    /// makes a balance negative.
    pub fn balance_value(&self) -> f64 {
        match self.marker {
            SignMarker::Negative => -self.magnitude,
            SignMarker::Positive | SignMarker::Unmarked => self.magnitude,
        }
    }

    /// Value read as a transaction amount under the grammar's convention.
    pub fn amount_value(&self, sign: SignConvention) -> f64 {
        match (self.marker, sign) {
            (SignMarker::Negative, _) => -self.magnitude,
            (SignMarker::Positive, _) => self.magnitude,
            (SignMarker::Unmarked, SignConvention::Minus) => self.magnitude,
            (SignMarker::Unmarked, SignConvention::CreditDebitSuffix) => -self.magnitude,
        }
    }

    pub(crate) fn shifted(self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
            ..self
        }
    }
}
