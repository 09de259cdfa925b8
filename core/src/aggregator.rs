//! Monthly aggregator: folds raw transactions into per-month totals.
//!
//! Credits and debits are summed per (year, month).
//! `debit_micro` rows are skipped here; the fraud check reads them
//! straight from the transaction list.

use crate::{
    error::{LoanError, LoanResult},
    transaction::{Transaction, TransactionKind},
    types::MonthKey,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub total_credit: Decimal,
    pub total_debit:  Decimal,
    pub net_cashflow: Decimal,
}

impl MonthlySummary {
    fn apply(&mut self, txn: &Transaction) -> LoanResult<()> {
        let total = match txn.kind {
            TransactionKind::Credit     => &mut self.total_credit,
            TransactionKind::Debit      => &mut self.total_debit,
            TransactionKind::DebitMicro => return Ok(()),
        };
        *total = total.checked_add(txn.amount).ok_or_else(|| overflow(txn))?;
        self.net_cashflow = self
            .total_credit
            .checked_sub(self.total_debit)
            .ok_or_else(|| overflow(txn))?;
        Ok(())
    }
}

fn overflow(txn: &Transaction) -> LoanError {
    LoanError::invalid_transaction(format!(
        "customer {} totals overflow in {}",
        txn.customer_id,
        txn.month_key()
    ))
}

/// Calendar-ordered monthly summaries for one customer.
pub type MonthlySummaries = BTreeMap<MonthKey, MonthlySummary>;

/// Aggregate transactions by calendar month.
///
/// A month with only `debit_micro` rows still gets a zero summary,
/// since it is present in the transaction set.
pub fn aggregate_by_month(transactions: &[Transaction]) -> LoanResult<MonthlySummaries> {
    let mut months = MonthlySummaries::new();
    for txn in transactions {
        txn.validate()?;
        months.entry(txn.month_key()).or_default().apply(txn)?;
    }
    Ok(months)
}

/// Sum of net cashflow across every month.
pub fn total_net_cashflow(months: &MonthlySummaries) -> LoanResult<Decimal> {
    months
        .values()
        .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(m.net_cashflow))
        .ok_or_else(|| LoanError::invalid_transaction("total net cashflow overflows"))
}
