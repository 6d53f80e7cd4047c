use chrono::NaiveDate;
use ledgerline_core::{Bank, ParseError, UNKNOWN_ACCOUNT};
use ledgerline_ingest::{
    CompiledGrammar, GrammarRegistry, LayoutGrammar, StatementParser, parse_with_grammar,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn demo_grammar(extra: &str) -> LayoutGrammar {
    let src = format!(
        r#"
bank = "demo"
markers = ["Demo Bank"]
date_style = "day_month_year"
opening_markers = ["Opening Balance"]
{extra}
"#
    );
    toml::from_str(&src).unwrap()
}

fn compiled(extra: &str) -> CompiledGrammar {
    CompiledGrammar::compile(demo_grammar(extra)).unwrap()
}

#[test]
fn test_end_to_end_two_rows() {
    let g = compiled("");
    let text = "01/01/2026 Opening Balance 1000.00 \n 02/01/2026 Coffee Shop 50.00 950.00 \n 03/01/2026 Salary 2000.00 2950.00";
    let parsed = parse_with_grammar(text, &g).unwrap();

    assert_eq!(parsed.transactions.len(), 2);
    let coffee = &parsed.transactions[0];
    assert_eq!(coffee.date, ymd(2026, 1, 2));
    assert_eq!(coffee.amount, -50.0);
    assert_eq!(coffee.balance, 950.0);
    assert_eq!(coffee.description, "Coffee Shop");
    assert_eq!(coffee.account_id, UNKNOWN_ACCOUNT);

    let salary = &parsed.transactions[1];
    assert_eq!(salary.date, ymd(2026, 1, 3));
    assert_eq!(salary.amount, 2000.0);
    assert_eq!(salary.balance, 2950.0);
    assert_eq!(salary.description, "Salary");

    assert!(parsed.validation.valid, "{:?}", parsed.validation.warnings);
    assert_eq!(parsed.metadata.bank, Bank::Custom("demo".to_string()));
    assert_eq!(parsed.metadata.opening_balance, Some(1000.0));
}

#[test]
fn test_missing_amount_comes_from_balance_delta() {
    let g = compiled("");
    let text = "01/01/2026 Opening Balance 1000.00 02/01/2026 ATM Withdrawal 850.00";
    let parsed = parse_with_grammar(text, &g).unwrap();
    assert_eq!(parsed.transactions.len(), 1);
    assert_eq!(parsed.transactions[0].amount, -150.00);
    assert_eq!(parsed.transactions[0].description, "ATM Withdrawal");
    assert!(parsed.validation.valid);
}

#[test]
fn test_two_token_rows_are_deterministic() {
    let g = compiled(r#"columns = ["amount", "fee", "balance"]"#);
    let text = "01/01/2026 Opening Balance 1000.00 02/01/2026 Card Purchase 120.00 5.00 875.00";
    let first = parse_with_grammar(text, &g).unwrap();
    let second = parse_with_grammar(text, &g).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.transactions[0].amount, -125.0);
    assert!(first.validation.valid);
}

#[test]
fn test_unreconciled_row_is_flagged() {
    let g = compiled(r#"columns = ["amount", "fee", "balance"]"#);
    let text = "01/01/2026 Opening Balance 1000.00 02/01/2026 Card Purchase 7.00 3.00 900.00";
    let parsed = parse_with_grammar(text, &g).unwrap();
    assert_eq!(parsed.transactions[0].amount, -100.0);
    assert!(!parsed.validation.valid);
    assert_eq!(parsed.validation.warnings.len(), 1);
    assert!(parsed.validation.warnings[0].starts_with("Unreconciled amount on 2026-01-02"));
}

#[test]
fn test_section_end_marker_is_required() {
    let g = compiled(
        r#"
section_start = ["Transactions"]
section_end = ["Closing Balance"]
"#,
    );
    let with_end = "Demo Bank Transactions 01/01/2026 Opening Balance 1000.00 02/01/2026 Coffee 50.00 950.00 Closing Balance 950.00";
    let parsed = parse_with_grammar(with_end, &g).unwrap();
    assert_eq!(parsed.transactions.len(), 1);

    let without_end = "Demo Bank Transactions 01/01/2026 Opening Balance 1000.00 02/01/2026 Coffee 50.00 950.00";
    let err = parse_with_grammar(without_end, &g).unwrap_err();
    assert_eq!(err.code(), "TRANSACTION_SECTION_NOT_FOUND");
}

#[test]
fn test_custom_grammar_detected_ahead_of_builtins() {
    let mut registry = GrammarRegistry::builtin();
    registry.register(demo_grammar("")).unwrap();
    let parser = StatementParser::new(registry);

    // mentions FNB in a reference, but the custom grammar is tried first
    let text = "Demo Bank\n01/01/2026 Opening Balance 1000.00\n02/01/2026 Transfer to FNB 50.00 950.00";
    let parsed = parser.parse(text, None).unwrap();
    assert_eq!(parsed.metadata.bank, Bank::Custom("demo".to_string()));
    assert_eq!(parsed.transactions[0].description, "Transfer to FNB");
}

#[test]
fn test_unrecognized_text_is_fatal() {
    let parser = StatementParser::builtin();
    let err = parser
        .parse("Some Credit Union\n02/01/2026 Coffee 50.00 950.00", None)
        .unwrap_err();
    assert_eq!(err, ParseError::FormatNotRecognized);
    assert_eq!(err.code(), "FORMAT_NOT_RECOGNIZED");
}

#[test]
fn test_rows_without_money_are_skipped() {
    let g = compiled("");
    let text = "01/01/2026 Opening Balance 1000.00 02/01/2026 Page 2 of 3 03/01/2026 Coffee 50.00 950.00";
    let parsed = parse_with_grammar(text, &g).unwrap();
    assert_eq!(parsed.transactions.len(), 1);
    assert_eq!(parsed.transactions[0].date, ymd(2026, 1, 3));
    assert!(parsed.validation.valid);
}

#[test]
fn test_statement_serializes_to_json() {
    let g = compiled("");
    let text = "01/01/2026 Opening Balance 1000.00 02/01/2026 Coffee 50.00 950.00";
    let parsed = parse_with_grammar(text, &g).unwrap();
    let v = serde_json::to_value(&parsed).unwrap();
    assert_eq!(v["metadata"]["bank"], "demo");
    assert_eq!(v["transactions"][0]["date"], "2026-01-02");
    assert_eq!(v["transactions"][0]["amount"], -50.0);
    assert_eq!(v["validation"]["valid"], true);
}
