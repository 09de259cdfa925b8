use chrono::NaiveDate;
use loan_desk_core::{
    error::LoanError,
    statement::{normalize_kind, StatementParser},
    transaction::TransactionKind,
};
use rust_decimal_macros::dec;

const STATEMENT: &str = "
ACCOUNT STATEMENT - CURRENT ACCOUNT
Date        Type          Amount      Description
05-01-2025  UPI CR        1,25,000.50 Payment from Sharma Traders
07-01-2025  NEFT DR       40,000      Rent January
12-01-2025  ATM WDL       2,000       Cash withdrawal
03-02-2025  Credit        98000.00    Invoice 1142
31-02-2025  Credit        10          Impossible date
14-02-2025  REVERSAL      500         Unknown type
20-02-2025  Debit         -300        Negative amount
Closing balance 1,81,000.50
";

#[test]
fn parses_credit_and_debit_rows() {
    let parsed = StatementParser::new("cust_stmt").parse_text(STATEMENT);
    assert_eq!(parsed.len(), 4, "got {parsed:#?}");

    let first = &parsed[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    assert_eq!(first.transaction.kind, TransactionKind::Credit);
    assert_eq!(first.transaction.amount, dec!(125000.50));
    assert_eq!((first.transaction.year, first.transaction.month), (2025, 1));
    assert_eq!(first.transaction.customer_id, "cust_stmt");
    assert_eq!(first.description, "Payment from Sharma Traders");

    assert_eq!(parsed[1].transaction.kind, TransactionKind::Debit);
    assert_eq!(parsed[1].transaction.amount, dec!(40000));
    assert_eq!(parsed[2].transaction.kind, TransactionKind::Debit);
    assert_eq!(parsed[2].description, "Cash withdrawal");
    assert_eq!(parsed[3].transaction.month, 2);
}

#[test]
fn non_transaction_lines_are_not_errors() {
    let parser = StatementParser::new("cust_stmt");
    for line in ["", "   ", "Closing balance 1,81,000.50", "05-01-2025 CR 100"] {
        assert!(parser.parse_line(line).unwrap().is_none(), "line {line:?}");
    }
}

#[test]
fn malformed_rows_are_errors() {
    let parser = StatementParser::new("cust_stmt");
    for line in [
        "31-02-2025  Credit  10  Impossible date",
        "14-02-2025  REVERSAL  500  Unknown type",
        "20-02-2025  Debit  -300  Negative amount",
    ] {
        assert!(
            matches!(parser.parse_line(line), Err(LoanError::InvalidTransaction { .. })),
            "line {line:?}"
        );
    }
}

#[test]
fn first_keyword_decides_the_type() {
    assert_eq!(normalize_kind("IMPS IN").unwrap(), TransactionKind::Credit);
    assert_eq!(normalize_kind("dr cr").unwrap(), TransactionKind::Debit);
    assert_eq!(normalize_kind("Transfer OUT").unwrap(), TransactionKind::Debit);
    assert!(normalize_kind("CHQ").is_err());
}

#[test]
fn type_words_stop_at_first_amount() {
    let parsed = StatementParser::new("c")
        .parse_line("01-03-2025 NEFT CR 2500 ref 7781 from vendor")
        .unwrap()
        .unwrap();
    assert_eq!(parsed.transaction.amount, dec!(2500));
    assert_eq!(parsed.description, "ref 7781 from vendor");
}

#[test]
fn indented_rows_keep_description_text() {
    let parsed = StatementParser::new("c")
        .parse_line("    09-04-2025   IMPS IN   7,500   GST refund  Q4   ")
        .unwrap()
        .unwrap();
    assert_eq!(parsed.transaction.kind, TransactionKind::Credit);
    assert_eq!(parsed.transaction.amount, dec!(7500));
    assert_eq!(parsed.description, "GST refund  Q4");
}
