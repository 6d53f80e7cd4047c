use anyhow::{Context, Result};
use ledgerline_core::ParsedStatement;

pub fn to_json(parsed: &ParsedStatement, pretty: bool) -> Result<String> {
    let s = if pretty {
        serde_json::to_string_pretty(parsed)
    } else {
        serde_json::to_string(parsed)
    };
    s.context("serialize statement")
}

/// Spreadsheet layout: a short metadata block, a blank row, then one row per
/// transaction with debits and credits in separate columns.
pub fn to_csv(parsed: &ParsedStatement) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let meta = &parsed.metadata;
    let period = meta
        .period
        .map(|p| format!("{} to {}", p.from, p.to))
        .unwrap_or_default();
    wtr.write_record([
        "Account Holder",
        meta.account_holder.as_deref().unwrap_or(""),
    ])?;
    wtr.write_record(["Bank", meta.bank.display_name()])?;
    wtr.write_record(["Account Number", meta.account_id.as_str()])?;
    wtr.write_record(["Period", period.as_str()])?;
    wtr.write_record(["Currency", meta.currency.as_str()])?;
    wtr.write_record([""])?;

    wtr.write_record(["Date", "Description", "Debit", "Credit", "Balance"])?;
    for t in &parsed.transactions {
        let (debit, credit) = if t.is_debit() {
            (format!("{:.2}", t.amount.abs()), String::new())
        } else if t.is_credit() {
            (String::new(), format!("{:.2}", t.amount))
        } else {
            (String::new(), String::new())
        };
        wtr.write_record([
            t.date.to_string(),
            t.description.clone(),
            debit,
            credit,
            format!("{:.2}", t.balance),
        ])?;
    }

    let bytes = wtr.into_inner().context("flush csv")?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerline_core::{
        Bank, LedgerValidation, StatementMetadata, StatementPeriod, Transaction,
    };

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> ParsedStatement {
        let txn = |d, desc: &str, amount, balance| Transaction {
            date: ymd(2026, 1, d),
            description: desc.to_string(),
            amount,
            balance,
            account_id: "1234567890".to_string(),
        };
        ParsedStatement {
            metadata: StatementMetadata {
                bank: Bank::Capitec,
                account_id: "1234567890".to_string(),
                account_holder: Some("MR JOHN SMITH".to_string()),
                period: Some(StatementPeriod {
                    from: ymd(2026, 1, 1),
                    to: ymd(2026, 1, 31),
                }),
                opening_balance: Some(1000.0),
                closing_balance: Some(2950.0),
                currency: "ZAR".to_string(),
            },
            transactions: vec![
                txn(2, "Coffee, Sea Point", -50.0, 950.0),
                txn(3, "Salary", 2000.0, 2950.0),
            ],
            validation: LedgerValidation::from_warnings(vec![]),
        }
    }

    #[test]
    fn test_csv_layout() {
        let out = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Account Holder,MR JOHN SMITH");
        assert_eq!(lines[1], "Bank,Capitec");
        assert_eq!(lines[3], "Period,2026-01-01 to 2026-01-31");
        assert_eq!(lines[4], "Currency,ZAR");
        assert!(lines[5].trim_matches('"').is_empty());
        assert_eq!(lines[6], "Date,Description,Debit,Credit,Balance");
        assert_eq!(lines[7], "2026-01-02,\"Coffee, Sea Point\",50.00,,950.00");
        assert_eq!(lines[8], "2026-01-03,Salary,,2000.00,2950.00");
    }

    #[test]
    fn test_json_compact_and_pretty() {
        let parsed = sample();
        let compact = to_json(&parsed, false).unwrap();
        assert!(!compact.contains('\n'));
        let pretty = to_json(&parsed, true).unwrap();
        let back: ParsedStatement = serde_json::from_str(&pretty).unwrap();
        assert_eq!(back, parsed);
    }
}
