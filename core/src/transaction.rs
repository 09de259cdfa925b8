//! Transaction records: the only input the pipeline reads.
//!
//! RULE: transactions are never mutated once built.
//! `debit_micro` is a fraud marker, not a cashflow debit.

use crate::{
    error::{LoanError, LoanResult},
    types::{CustomerId, MonthKey},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
    DebitMicro,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit     => "credit",
            Self::Debit      => "debit",
            Self::DebitMicro => "debit_micro",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LoanError;

    fn from_str(s: &str) -> LoanResult<Self> {
        match s {
            "credit"      => Ok(Self::Credit),
            "debit"       => Ok(Self::Debit),
            "debit_micro" => Ok(Self::DebitMicro),
            other => Err(LoanError::invalid_transaction(format!(
                "unrecognized transaction type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub customer_id: CustomerId,
    pub year:        i32,
    pub month:       u32,
    pub amount:      Decimal,
    #[serde(rename = "type")]
    pub kind:        TransactionKind,
}

impl Transaction {
    pub fn new(
        customer_id: impl Into<CustomerId>,
        year: i32,
        month: u32,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            year,
            month,
            amount,
            kind,
        }
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }

    /// Reject records the aggregator cannot fold.
    pub fn validate(&self) -> LoanResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(LoanError::invalid_transaction(format!(
                "customer {} has month {} outside 1..=12",
                self.customer_id, self.month
            )));
        }
        if self.amount < Decimal::ZERO {
            return Err(LoanError::invalid_transaction(format!(
                "customer {} has negative amount {} in {}",
                self.customer_id,
                self.amount,
                self.month_key()
            )));
        }
        Ok(())
    }
}

/// Wire shape of a transaction inside a dataset file.
///
/// `type` stays free text here so an unknown value surfaces as
/// `InvalidTransaction` instead of a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub customer_id: CustomerId,
    pub year:        i32,
    pub month:       u32,
    pub amount:      Decimal,
    #[serde(rename = "type")]
    pub kind:        String,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = LoanError;

    fn try_from(record: TransactionRecord) -> LoanResult<Self> {
        let kind = record.kind.parse()?;
        Ok(Self {
            customer_id: record.customer_id,
            year:        record.year,
            month:       record.month,
            amount:      record.amount,
            kind,
        })
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(txn: &Transaction) -> Self {
        Self {
            customer_id: txn.customer_id.clone(),
            year:        txn.year,
            month:       txn.month,
            amount:      txn.amount,
            kind:        txn.kind.as_str().to_string(),
        }
    }
}
