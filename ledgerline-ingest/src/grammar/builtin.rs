//! Shipped layout grammars for South African retail statements.

use ledgerline_core::Bank;

use super::{
    Column, DateStyle, DecimalSeparator, LayoutGrammar, MetadataRules, MoneyFormat,
    SignConvention, ThousandsSeparator,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Built-in grammars in detection order. Capitec statements mention other
/// banks in their payment references, so Capitec is tried first; FNB's
/// markers are the most generic and it is tried last. Markers name the
/// statement banner rather than the bank alone wherever a bare bank name
/// could turn up in another bank's transaction references.
pub fn builtin_grammars() -> Vec<LayoutGrammar> {
    vec![capitec(), absa(), nedbank(), fnb()]
}

fn capitec() -> LayoutGrammar {
    LayoutGrammar {
        bank: Bank::Capitec,
        markers: strings(&["capitec", "unique document no"]),
        date_style: DateStyle::DayMonthYear,
        money: MoneyFormat {
            decimal: DecimalSeparator::Dot,
            thousands: vec![ThousandsSeparator::Space, ThousandsSeparator::Comma],
            sign: SignConvention::Minus,
            symbol: Some("R".to_string()),
        },
        columns: vec![Column::MoneyIn, Column::MoneyOut, Column::Fee, Column::Balance],
        section_start: strings(&[
            r"(?i)^Date\s+Description\s+Category",
            r"(?i)^Transaction History",
        ]),
        section_end: strings(&[r"(?i)^Closing Balance\b"]),
        opening_markers: strings(&["Opening Balance"]),
        boilerplate: strings(&[
            "Unique Document No",
            "24hr Client Care Centre",
            "Capitec Bank is an authorised",
            "* Includes VAT",
            "Date Description Category",
        ]),
        line_based: true,
        currency: "ZAR".to_string(),
        metadata: MetadataRules {
            account: strings(&[r"(?i)\bAccount\s*(?:No\.?|Number)?\s*:?\s*(\d{10,})"]),
            holder: strings(&[r"\b((?:MR|MRS|MS|DR)\.?(?: [A-Z]+){1,2})\b"]),
            period: strings(&[
                r"(?is)From Date:?\s*(\d{2}/\d{2}/\d{4}).*?To Date:?\s*(\d{2}/\d{2}/\d{4})",
            ]),
            opening: strings(&[r"(?i)Opening Balance:"]),
            closing: strings(&[r"(?i)Closing Balance:"]),
        },
    }
}

fn fnb() -> LayoutGrammar {
    const MONTH_DATE: &str = r"(\d{1,2}\s+[A-Za-z]+\s+\d{4})";
    LayoutGrammar {
        bank: Bank::Fnb,
        markers: strings(&["first national bank", "fnb", "bbst"]),
        date_style: DateStyle::DayMonthName,
        money: MoneyFormat {
            decimal: DecimalSeparator::Dot,
            thousands: vec![ThousandsSeparator::Comma],
            sign: SignConvention::CreditDebitSuffix,
            symbol: None,
        },
        columns: vec![Column::Amount, Column::Balance, Column::AccruedCharges],
        section_start: strings(&[
            r"(?i)Transactions in RAND(?:\s*\(ZAR\))?",
            r"(?i)Transaksies in RAND(?:\s*\(ZAR\))?",
        ]),
        section_end: strings(&[r"(?i)\bClosing Balance\b", r"(?i)\bAfsluitingsaldo\b"]),
        opening_markers: strings(&["Opening Balance", "Openingsaldo"]),
        boilerplate: strings(&[
            "Turnover for Statement Period",
            "Omset vir Staat Periode",
            "Delivery Method",
        ]),
        line_based: false,
        currency: "ZAR".to_string(),
        metadata: MetadataRules {
            account: strings(&[
                r"(?i)Account\s*(?:Number)?\s*:?\s*(\d{11})",
                r"(\d{11})\s+FNB",
            ]),
            holder: strings(&[r"\b((?:MR|MRS|MS|DR)\.?(?: [A-Z]+){1,2})\b"]),
            period: vec![
                format!(r"(?i)Statement Period\s*:?\s*{MONTH_DATE}\s+to\s+{MONTH_DATE}"),
                format!(r"(?i)Staat Periode\s*:?\s*{MONTH_DATE}\s+tot\s+{MONTH_DATE}"),
            ],
            opening: vec![],
            closing: vec![],
        },
    }
}

fn absa() -> LayoutGrammar {
    LayoutGrammar {
        bank: Bank::Absa,
        markers: strings(&[
            "absa bank limited",
            "absa cheque account statement",
            "absa current account statement",
            "absa savings account statement",
        ]),
        date_style: DateStyle::DayMonthYear,
        money: MoneyFormat {
            decimal: DecimalSeparator::Comma,
            thousands: vec![ThousandsSeparator::Space],
            sign: SignConvention::Minus,
            symbol: None,
        },
        columns: vec![Column::Fee, Column::Amount, Column::Balance],
        // the table header; without it a misdetected statement fails
        // instead of being read with comma decimals
        section_start: strings(&[r"(?i)\bTransaction\s+Description\b"]),
        section_end: vec![],
        opening_markers: strings(&["Balance Brought Forward"]),
        boilerplate: strings(&[
            "Our Privacy Notice",
            "Absa Bank Limited",
            "Authorised Financial Services",
        ]),
        line_based: false,
        currency: "ZAR".to_string(),
        metadata: MetadataRules {
            account: strings(&[
                r"(?i)Account\D{0,20}?(\d{2}-\d{4}-\d{4})",
                r"(\d{2}-\d{4}-\d{4})",
            ]),
            holder: strings(&[r"\b((?:MR|MRS|MS|DR)\.?(?: [A-Z]+){1,2})\b"]),
            period: strings(&[
                r"(?i)Statement Period:?\s*(\d{2}/\d{2}/\d{4})\s*(?:to|-)\s*(\d{2}/\d{2}/\d{4})",
            ]),
            opening: vec![],
            closing: vec![],
        },
    }
}

fn nedbank() -> LayoutGrammar {
    LayoutGrammar {
        bank: Bank::Nedbank,
        markers: strings(&["nedbank"]),
        date_style: DateStyle::DayMonthYear,
        money: MoneyFormat {
            decimal: DecimalSeparator::Dot,
            thousands: vec![ThousandsSeparator::Comma],
            sign: SignConvention::Minus,
            symbol: Some("R".to_string()),
        },
        columns: vec![Column::Fee, Column::MoneyOut, Column::MoneyIn, Column::Balance],
        section_start: vec![],
        section_end: vec![],
        opening_markers: strings(&["Opening balance"]),
        boilerplate: strings(&["Nedbank Ltd Reg No", "See terms and conditions"]),
        line_based: true,
        currency: "ZAR".to_string(),
        metadata: MetadataRules {
            account: strings(&[r"(?i)Current account\s+(\d{6,})"]),
            holder: strings(&[r"\b((?:MR|MRS|MS|DR)\.?(?: [A-Z]+){1,2})\b"]),
            period: strings(&[
                r"(?i)Statement period:?\s*(\d{2}/\d{2}/\d{4})\s*(?:to|-)\s*(\d{2}/\d{2}/\d{4})",
            ]),
            opening: strings(&[r"(?i)Opening balance"]),
            closing: strings(&[r"(?i)Closing balance"]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::CompiledGrammar;

    #[test]
    fn test_every_builtin_compiles() {
        for grammar in builtin_grammars() {
            let bank = grammar.bank.clone();
            assert!(
                CompiledGrammar::compile(grammar).is_ok(),
                "{bank} grammar failed to compile"
            );
        }
    }

    #[test]
    fn test_absa_needs_a_statement_banner() {
        let absa = CompiledGrammar::compile(absa()).unwrap();
        assert!(absa.matches_markers("absa cheque account statement"));
        assert!(!absa.matches_markers("payment to absa home loan"));
    }

    #[test]
    fn test_capitec_is_tried_before_fnb() {
        let order: Vec<Bank> = builtin_grammars().into_iter().map(|g| g.bank).collect();
        let capitec = order.iter().position(|b| *b == Bank::Capitec).unwrap();
        let fnb = order.iter().position(|b| *b == Bank::Fnb).unwrap();
        assert!(capitec < fnb);
    }
}
