//! Transaction sources: where the metrics cache reads history from.
//!
//! RULE: a source must be re-readable in full. The cache calls
//! `load()` once per (re)initialization and never asks for a subset.

use crate::{
    error::LoanResult,
    transaction::{Transaction, TransactionRecord},
    types::CustomerId,
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Every customer's full transaction history.
pub type TransactionSet = BTreeMap<CustomerId, Vec<Transaction>>;

pub trait TransactionSource: Send + Sync {
    /// Short label used in log lines.
    fn describe(&self) -> String;

    /// Read the whole population.
    fn load(&self) -> LoanResult<TransactionSet>;
}

/// One customer's entry in a dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile:      Option<String>,
    pub transactions: Vec<TransactionRecord>,
}

/// On-disk dataset: customer id -> record.
pub type DatasetFile = BTreeMap<CustomerId, CustomerRecord>;

/// Convert a parsed dataset into typed transactions.
pub fn transactions_from_dataset(file: DatasetFile) -> LoanResult<TransactionSet> {
    file.into_iter()
        .map(|(customer_id, record)| {
            let txns = record
                .transactions
                .into_iter()
                .map(Transaction::try_from)
                .collect::<LoanResult<Vec<_>>>()?;
            Ok((customer_id, txns))
        })
        .collect()
}

// ── JSON file ────────────────────────────────────────────────────────────────

/// Reads the dataset JSON written by the generator.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TransactionSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn load(&self) -> LoanResult<TransactionSet> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read transaction source {}", self.path.display()))?;
        let file: DatasetFile = serde_json::from_str(&content)?;
        transactions_from_dataset(file)
    }
}

// ── In memory ────────────────────────────────────────────────────────────────

/// A fixed, pre-built population. Each load hands out a clone.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    transactions: TransactionSet,
}

impl InMemorySource {
    pub fn new(transactions: TransactionSet) -> Self {
        Self { transactions }
    }

    /// Build from a flat list, grouping by `customer_id`.
    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let mut grouped = TransactionSet::new();
        for txn in transactions {
            grouped.entry(txn.customer_id.clone()).or_default().push(txn);
        }
        Self::new(grouped)
    }
}

impl TransactionSource for InMemorySource {
    fn describe(&self) -> String {
        format!("memory:{} customers", self.transactions.len())
    }

    fn load(&self) -> LoanResult<TransactionSet> {
        Ok(self.transactions.clone())
    }
}
