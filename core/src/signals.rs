//! Risk signal calculator.
//!
//! Derives, per customer:
//!   1. Growth:     first-to-last month change in net cashflow
//!   2. Volatility: coefficient of variation of monthly net cashflow
//!   3. Stability:  bucket of the cv (or loss_making)
//!   4. Fraud flag: any `debit_micro` transaction
//!   5. Loss flag:  total net cashflow below zero
//!
//! Ratios are rounded to 4 dp with banker's rounding.

use crate::{
    aggregator::{aggregate_by_month, total_net_cashflow, MonthlySummaries},
    error::{LoanError, LoanResult},
    transaction::{Transaction, TransactionKind},
};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Constants ────────────────────────────────────────────────────────────────

const RATIO_DP: u32 = 4;
const STABLE_CV_MAX: Decimal = Decimal::from_parts(15, 0, 0, false, 2); // 0.15
const MODERATE_CV_MAX: Decimal = Decimal::from_parts(35, 0, 0, false, 2); // 0.35

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Moderate,
    Unstable,
    LossMaking,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable     => "stable",
            Self::Moderate   => "moderate",
            Self::Unstable   => "unstable",
            Self::LossMaking => "loss_making",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volatility {
    pub cv:        Decimal,
    pub stability: Stability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSignals {
    pub growth:     Decimal,
    pub cv:         Decimal,
    pub stability:  Stability,
    pub fraud_flag: bool,
    pub loss_flag:  bool,
}

// ── Computations ─────────────────────────────────────────────────────────────

fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATIO_DP, RoundingStrategy::MidpointNearestEven)
}

fn overflow(what: &str) -> LoanError {
    LoanError::invalid_transaction(format!("{what} overflows decimal range"))
}

/// Relative change in net cashflow from the earliest to the latest month.
pub fn compute_growth(months: &MonthlySummaries) -> LoanResult<Decimal> {
    if months.len() < 2 {
        return Ok(Decimal::ZERO);
    }
    let (Some((_, first)), Some((_, last))) = (months.first_key_value(), months.last_key_value())
    else {
        return Ok(Decimal::ZERO);
    };

    let first_cf = first.net_cashflow;
    if first_cf.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let growth = last
        .net_cashflow
        .checked_sub(first_cf)
        .and_then(|change| change.checked_div(first_cf.abs()))
        .ok_or_else(|| overflow("growth"))?;
    Ok(round_ratio(growth))
}

/// Coefficient of variation of monthly net cashflow, and its bucket.
///
/// A non-positive mean short-circuits to `{0, loss_making}`.
/// Stability is bucketed on the unrounded cv; only the reported cv is rounded.
pub fn compute_volatility(months: &MonthlySummaries) -> LoanResult<Volatility> {
    if months.is_empty() {
        return Ok(Volatility { cv: Decimal::ZERO, stability: Stability::Stable });
    }

    let count = Decimal::from(months.len());
    let mean = total_net_cashflow(months)? / count;
    if mean <= Decimal::ZERO {
        return Ok(Volatility { cv: Decimal::ZERO, stability: Stability::LossMaking });
    }

    // relative deviations: their mean square is cv^2
    let relative_variance = months
        .values()
        .try_fold(Decimal::ZERO, |acc, m| {
            let dev = m.net_cashflow.checked_sub(mean)?.checked_div(mean)?;
            acc.checked_add(dev.checked_mul(dev)?)
        })
        .ok_or_else(|| overflow("cashflow variance"))?
        / count;
    let cv = relative_variance.sqrt().ok_or_else(|| overflow("cashflow variance"))?;

    Ok(Volatility { cv: round_ratio(cv), stability: classify(mean, cv) })
}

fn classify(mean: Decimal, cv: Decimal) -> Stability {
    if mean < Decimal::ZERO {
        Stability::LossMaking
    } else if cv <= STABLE_CV_MAX {
        Stability::Stable
    } else if cv <= MODERATE_CV_MAX {
        Stability::Moderate
    } else {
        Stability::Unstable
    }
}

pub fn has_fraud_pattern(transactions: &[Transaction]) -> bool {
    transactions
        .iter()
        .any(|t| t.kind == TransactionKind::DebitMicro)
}

/// Full signal set for one customer's transaction history.
pub fn compute_signals(transactions: &[Transaction]) -> LoanResult<RiskSignals> {
    let months = aggregate_by_month(transactions)?;
    signals_from_months(&months, has_fraud_pattern(transactions))
}

pub fn signals_from_months(months: &MonthlySummaries, fraud_flag: bool) -> LoanResult<RiskSignals> {
    let volatility = compute_volatility(months)?;
    Ok(RiskSignals {
        growth:     compute_growth(months)?,
        cv:         volatility.cv,
        stability:  volatility.stability,
        fraud_flag,
        loss_flag:  total_net_cashflow(months)? < Decimal::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cv_thresholds_are_exact() {
        assert_eq!(STABLE_CV_MAX.to_string(), "0.15");
        assert_eq!(MODERATE_CV_MAX.to_string(), "0.35");
    }

    #[test]
    fn classification_boundaries_are_inclusive() {
        let mean = Decimal::ONE;
        assert_eq!(classify(mean, STABLE_CV_MAX), Stability::Stable);
        assert_eq!(classify(mean, MODERATE_CV_MAX), Stability::Moderate);
        assert_eq!(classify(mean, Decimal::new(3501, 4)), Stability::Unstable);
        assert_eq!(classify(-mean, Decimal::ZERO), Stability::LossMaking);
    }

    #[test]
    fn midpoint_rounds_to_even() {
        assert_eq!(round_ratio(Decimal::new(125, 5)), Decimal::new(12, 4));
        assert_eq!(round_ratio(Decimal::new(135, 5)), Decimal::new(14, 4));
    }
}
