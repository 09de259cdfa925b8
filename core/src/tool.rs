//! Eligibility tool: the only surface exposed to orchestrating callers.
//!
//! RULE: the requested amount becomes a `Decimal` before any comparison.
//! Decisions leave as `{"eligible": bool, "reason_code": "<CODE>"}`.
//!
//! Tool dispatch is a closed enum. A tool name is matched exactly once,
//! when a call is parsed; everything after is an exhaustive `match`.

use crate::{
    cache::MetricsCache,
    error::{LoanError, LoanResult},
    rule_engine::{Decision, PolicyEngine, ReasonCode},
    source::TransactionSource,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

pub const GET_LOAN_ELIGIBILITY: &str = "get_customer_loan_eligibility";

// ── Tool calls ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EligibilityArgs {
    pub customer_id: String,
    pub loan_amount: f64,
}

/// Every tool this crate answers.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GetCustomerLoanEligibility(EligibilityArgs),
}

#[derive(Deserialize)]
struct RawToolCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl ToolCall {
    /// Parse `{"name": "...", "arguments": {...}}`.
    pub fn from_json(json: &str) -> LoanResult<Self> {
        let raw: RawToolCall = serde_json::from_str(json)?;
        Self::from_parts(&raw.name, raw.arguments)
    }

    pub fn from_parts(name: &str, arguments: Value) -> LoanResult<Self> {
        match name {
            GET_LOAN_ELIGIBILITY => Ok(Self::GetCustomerLoanEligibility(
                serde_json::from_value(arguments)?,
            )),
            other => Err(LoanError::UnknownTool { name: other.to_string() }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetCustomerLoanEligibility(_) => GET_LOAN_ELIGIBILITY,
        }
    }
}

/// Exact decimal form of a transport number.
///
/// Goes through the shortest round-trip text of the float, so `1234.56`
/// becomes `1234.56` and not its binary expansion.
pub fn loan_amount_to_decimal(value: f64) -> LoanResult<Decimal> {
    let invalid = || LoanError::InvalidLoanAmount { value: value.to_string() };
    if !value.is_finite() {
        return Err(invalid());
    }
    let amount = Decimal::from_str(&value.to_string()).map_err(|_| invalid())?;
    if amount < Decimal::ZERO {
        return Err(invalid());
    }
    Ok(amount)
}

/// Function schema an orchestrator registers for the eligibility tool.
pub fn eligibility_tool_schema() -> Value {
    json!({
        "type": "function",
        "name": GET_LOAN_ELIGIBILITY,
        "description": "Evaluate whether a customer is eligible for a loan under current policy.",
        "parameters": {
            "type": "object",
            "properties": {
                "customer_id": {
                    "type": "string",
                    "description": "Unique identifier of the customer"
                },
                "loan_amount": {
                    "type": "number",
                    "description": "Requested loan amount"
                }
            },
            "required": ["customer_id", "loan_amount"],
            "additionalProperties": false
        }
    })
}

// ── Tool ─────────────────────────────────────────────────────────────────────

pub struct EligibilityTool<S> {
    cache:  MetricsCache<S>,
    engine: PolicyEngine,
}

impl<S: TransactionSource> EligibilityTool<S> {
    pub fn new(cache: MetricsCache<S>, engine: PolicyEngine) -> Self {
        Self { cache, engine }
    }

    pub fn cache(&self) -> &MetricsCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut MetricsCache<S> {
        &mut self.cache
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Decision for a transport-level (float) amount.
    pub fn get_loan_eligibility(&self, customer_id: &str, loan_amount: f64) -> LoanResult<Decision> {
        let amount = loan_amount_to_decimal(loan_amount)?;
        self.get_loan_eligibility_decimal(customer_id, amount)
    }

    /// Decision for a caller that already holds an exact amount.
    pub fn get_loan_eligibility_decimal(
        &self,
        customer_id: &str,
        loan_amount: Decimal,
    ) -> LoanResult<Decision> {
        if loan_amount < Decimal::ZERO {
            return Err(LoanError::InvalidLoanAmount { value: loan_amount.to_string() });
        }

        let decision = match self.cache.get_signals(customer_id)? {
            Some(signals) => self.engine.evaluate(signals, loan_amount),
            None => Decision::reject(ReasonCode::CustomerNotFound),
        };

        log::info!(
            "eligibility customer={customer_id} amount={loan_amount} -> {}",
            decision.reason_code
        );
        Ok(decision)
    }

    /// Run a parsed tool call and return its JSON result.
    pub fn dispatch(&self, call: &ToolCall) -> LoanResult<Value> {
        match call {
            ToolCall::GetCustomerLoanEligibility(args) => {
                let decision = self.get_loan_eligibility(&args.customer_id, args.loan_amount)?;
                Ok(serde_json::to_value(decision)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_amount_keeps_its_decimal_text() {
        assert_eq!(loan_amount_to_decimal(1234.56).unwrap(), Decimal::new(123_456, 2));
        assert_eq!(loan_amount_to_decimal(0.1).unwrap(), Decimal::new(1, 1));
        assert_eq!(loan_amount_to_decimal(500000.0).unwrap(), Decimal::new(500_000, 0));
    }

    #[test]
    fn non_finite_and_negative_amounts_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1.0, 1e300] {
            assert!(
                matches!(loan_amount_to_decimal(bad), Err(LoanError::InvalidLoanAmount { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_tool_name_rejected() {
        let err = ToolCall::from_json(r#"{"name": "transfer_funds", "arguments": {}}"#).unwrap_err();
        assert!(matches!(err, LoanError::UnknownTool { ref name } if name == "transfer_funds"));
    }

    #[test]
    fn tool_call_parses_arguments() {
        let call = ToolCall::from_json(
            r#"{"name": "get_customer_loan_eligibility",
                "arguments": {"customer_id": "cust_007", "loan_amount": 250000}}"#,
        )
        .unwrap();
        assert_eq!(call.name(), GET_LOAN_ELIGIBILITY);
        let ToolCall::GetCustomerLoanEligibility(args) = call;
        assert_eq!(args.customer_id, "cust_007");
        assert_eq!(args.loan_amount, 250000.0);
    }
}
