//! Bank statement text parser.
//!
//! Line shape:
//!   DD-MM-YYYY  <type words>  <amount>  <description>
//!
//! The type words end at the first amount-shaped token that still has a
//! description after it. Lines without that shape are not transactions
//! and are skipped quietly; lines with the shape but bad content are
//! skipped with a warning.

use crate::{
    error::{LoanError, LoanResult},
    transaction::{Transaction, TransactionKind},
    types::CustomerId,
};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

const DATE_FORMAT: &str = "%d-%m-%Y";
const CREDIT_KEYWORDS: &[&str] = &["credit", "cr", "in"];
const DEBIT_KEYWORDS: &[&str] = &["debit", "dr", "wdl", "out"];

// date, type words (lazy), amount, description
static TXN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}-\d{2}-\d{4})\s+(.+?)\s+(-?[\d,]+(?:\.\d+)?)\s+(.+)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTransaction {
    pub date:        NaiveDate,
    pub description: String,
    #[serde(flatten)]
    pub transaction: Transaction,
}

pub struct StatementParser {
    customer_id: CustomerId,
}

impl StatementParser {
    pub fn new(customer_id: impl Into<CustomerId>) -> Self {
        Self { customer_id: customer_id.into() }
    }

    /// Parse every transaction line in `raw`.
    pub fn parse_text(&self, raw: &str) -> Vec<ParsedTransaction> {
        raw.lines()
            .filter_map(|line| match self.parse_line(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::warn!("statement {}: skipping line '{}': {e}", self.customer_id, line.trim());
                    None
                }
            })
            .collect()
    }

    /// Parse one line. `Ok(None)` means the line is not a transaction row.
    pub fn parse_line(&self, line: &str) -> LoanResult<Option<ParsedTransaction>> {
        let Some(caps) = TXN_PATTERN.captures(line.trim()) else {
            return Ok(None);
        };
        let (_, [date_raw, kind_raw, amount_raw, description]) = caps.extract();

        let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT).map_err(|e| {
            LoanError::invalid_transaction(format!("bad date '{date_raw}': {e}"))
        })?;
        let kind = normalize_kind(kind_raw)?;
        let amount = parse_amount(amount_raw)?;
        if amount < Decimal::ZERO {
            return Err(LoanError::invalid_transaction(format!("negative amount {amount}")));
        }

        Ok(Some(ParsedTransaction {
            date,
            description: description.trim().to_string(),
            transaction: Transaction::new(
                self.customer_id.clone(),
                date.year(),
                date.month(),
                amount,
                kind,
            ),
        }))
    }
}

/// Map free-text type words to credit or debit.
/// Words are scanned left to right; the first keyword hit decides.
pub fn normalize_kind(raw: &str) -> LoanResult<TransactionKind> {
    let lowered = raw.to_lowercase();
    for word in lowered.split_whitespace() {
        if CREDIT_KEYWORDS.contains(&word) {
            return Ok(TransactionKind::Credit);
        }
        if DEBIT_KEYWORDS.contains(&word) {
            return Ok(TransactionKind::Debit);
        }
    }
    Err(LoanError::invalid_transaction(format!("unknown transaction type: {raw}")))
}

fn parse_amount(raw: &str) -> LoanResult<Decimal> {
    let cleaned = raw.replace(',', "");
    Decimal::from_str(&cleaned)
        .map_err(|e| LoanError::invalid_transaction(format!("bad amount '{raw}': {e}")))
}
