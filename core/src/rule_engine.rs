//! Policy rule engine: signals + amount -> decision.
//!
//! CHECK ORDER (fixed, never reordered):
//!   1. Tier selection:  first rule with amount <= max_amount
//!   2. Loss:            absolute disqualifier
//!   3. Fraud:           absolute disqualifier
//!   4. Growth:          only when the tier requires it
//!   5. Volatility:      cv against the tier's max_cv
//!
//! The first failing check is the decision. Nothing after it runs.

use crate::{
    config::{PolicyConfig, PolicyRule},
    error::{LoanError, LoanResult},
    signals::RiskSignals,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, machine-readable decision reasons.
/// Callers branch on these; never rename a variant's wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Eligible,
    LoanAmountExceedsPolicyLimit,
    LossMaking,
    FraudPatternDetected,
    NegativeGrowth,
    VolatilityThresholdExceeded,
    CustomerNotFound,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eligible                     => "ELIGIBLE",
            Self::LoanAmountExceedsPolicyLimit => "LOAN_AMOUNT_EXCEEDS_POLICY_LIMIT",
            Self::LossMaking                   => "LOSS_MAKING",
            Self::FraudPatternDetected         => "FRAUD_PATTERN_DETECTED",
            Self::NegativeGrowth               => "NEGATIVE_GROWTH",
            Self::VolatilityThresholdExceeded  => "VOLATILITY_THRESHOLD_EXCEEDED",
            Self::CustomerNotFound             => "CUSTOMER_NOT_FOUND",
        }
    }

    /// Human-readable explanation. Not part of the decision contract.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Eligible                     => "Meets all policy conditions",
            Self::LoanAmountExceedsPolicyLimit => "Loan amount exceeds policy limit",
            Self::LossMaking                   => "Business is loss making",
            Self::FraudPatternDetected         => "Fraud pattern detected",
            Self::NegativeGrowth               => "Negative growth",
            Self::VolatilityThresholdExceeded  => "Cashflow volatility exceeds threshold",
            Self::CustomerNotFound             => "Customer not found",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub eligible:    bool,
    pub reason_code: ReasonCode,
}

impl Decision {
    pub fn approve() -> Self {
        Self { eligible: true, reason_code: ReasonCode::Eligible }
    }

    pub fn reject(reason_code: ReasonCode) -> Self {
        Self { eligible: false, reason_code }
    }
}

pub struct PolicyEngine {
    rules: Vec<PolicyRule>,
}

impl PolicyEngine {
    /// Validate the table once, up front. A bad table never reaches
    /// a request.
    pub fn new(rules: Vec<PolicyRule>) -> LoanResult<Self> {
        if rules.is_empty() {
            return Err(LoanError::invalid_policy("policy table has no rules"));
        }
        for (i, rule) in rules.iter().enumerate() {
            if rule.max_amount < Decimal::ZERO {
                return Err(LoanError::invalid_policy(format!(
                    "rule {i} has negative max_amount {}",
                    rule.max_amount
                )));
            }
            if rule.max_cv < Decimal::ZERO {
                return Err(LoanError::invalid_policy(format!(
                    "rule {i} has negative max_cv {}",
                    rule.max_cv
                )));
            }
        }
        if rules.windows(2).any(|w| w[1].max_amount < w[0].max_amount) {
            log::warn!("policy tiers are not in ascending max_amount order; later tiers may be unreachable");
        }
        Ok(Self { rules })
    }

    pub fn from_config(config: PolicyConfig) -> LoanResult<Self> {
        Self::new(config.loan_rules)
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// First tier whose ceiling covers `loan_amount`.
    pub fn select_rule(&self, loan_amount: Decimal) -> Option<&PolicyRule> {
        self.rules.iter().find(|r| loan_amount <= r.max_amount)
    }

    pub fn evaluate(&self, signals: &RiskSignals, loan_amount: Decimal) -> Decision {
        let Some(rule) = self.select_rule(loan_amount) else {
            return Decision::reject(ReasonCode::LoanAmountExceedsPolicyLimit);
        };

        if signals.loss_flag {
            return Decision::reject(ReasonCode::LossMaking);
        }
        if signals.fraud_flag {
            return Decision::reject(ReasonCode::FraudPatternDetected);
        }
        if rule.require_positive_growth && signals.growth <= Decimal::ZERO {
            return Decision::reject(ReasonCode::NegativeGrowth);
        }
        if signals.cv > rule.max_cv {
            return Decision::reject(ReasonCode::VolatilityThresholdExceeded);
        }

        Decision::approve()
    }
}
