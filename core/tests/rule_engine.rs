use loan_desk_core::{
    config::{PolicyConfig, PolicyRule},
    error::LoanError,
    rule_engine::{Decision, PolicyEngine, ReasonCode},
    signals::{RiskSignals, Stability},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn healthy() -> RiskSignals {
    RiskSignals {
        growth:     dec!(0.5),
        cv:         dec!(0.1666),
        stability:  Stability::Moderate,
        fraud_flag: false,
        loss_flag:  false,
    }
}

fn engine() -> PolicyEngine {
    PolicyEngine::from_config(PolicyConfig::default_policy()).unwrap()
}

fn rule(max_amount: Decimal, max_cv: Decimal, require_positive_growth: bool) -> PolicyRule {
    PolicyRule { max_amount, max_cv, require_positive_growth }
}

#[test]
fn healthy_customer_within_first_tier_is_eligible() {
    let decision = engine().evaluate(&healthy(), dec!(300000));
    assert_eq!(decision, Decision::approve());
}

#[test]
fn tier_boundary_is_inclusive() {
    let engine = engine();
    assert_eq!(engine.select_rule(dec!(500000)).unwrap().max_cv, dec!(0.35));
    assert_eq!(engine.select_rule(dec!(500000.01)).unwrap().max_cv, dec!(0.25));
    assert_eq!(engine.select_rule(dec!(2000000)).unwrap().max_cv, dec!(0.25));
    assert!(engine.select_rule(dec!(2000000.01)).is_none());
}

#[test]
fn amount_above_every_tier_exceeds_limit() {
    let decision = engine().evaluate(&healthy(), dec!(2500000));
    assert_eq!(decision, Decision::reject(ReasonCode::LoanAmountExceedsPolicyLimit));
}

#[test]
fn limit_check_runs_before_loss_and_fraud() {
    let signals = RiskSignals { loss_flag: true, fraud_flag: true, ..healthy() };
    let decision = engine().evaluate(&signals, dec!(99999999));
    assert_eq!(decision.reason_code, ReasonCode::LoanAmountExceedsPolicyLimit);
}

#[test]
fn loss_disqualifies_even_when_everything_else_passes() {
    let signals = RiskSignals { loss_flag: true, ..healthy() };
    for amount in [dec!(1), dec!(500000), dec!(1500000)] {
        assert_eq!(
            engine().evaluate(&signals, amount),
            Decision::reject(ReasonCode::LossMaking),
            "amount {amount}"
        );
    }
}

#[test]
fn loss_is_checked_before_fraud() {
    let signals = RiskSignals { loss_flag: true, fraud_flag: true, ..healthy() };
    assert_eq!(engine().evaluate(&signals, dec!(1000)).reason_code, ReasonCode::LossMaking);
}

#[test]
fn fraud_disqualifies_even_when_everything_else_passes() {
    let signals = RiskSignals { fraud_flag: true, ..healthy() };
    assert_eq!(
        engine().evaluate(&signals, dec!(1000)),
        Decision::reject(ReasonCode::FraudPatternDetected)
    );
}

#[test]
fn fraud_is_checked_before_growth_and_volatility() {
    let signals = RiskSignals {
        fraud_flag: true,
        growth: dec!(-0.3),
        cv: dec!(0.9),
        ..healthy()
    };
    assert_eq!(engine().evaluate(&signals, dec!(1000)).reason_code, ReasonCode::FraudPatternDetected);
}

#[test]
fn zero_growth_counts_as_negative_when_required() {
    let signals = RiskSignals { growth: Decimal::ZERO, ..healthy() };
    assert_eq!(
        engine().evaluate(&signals, dec!(1000)),
        Decision::reject(ReasonCode::NegativeGrowth)
    );
}

#[test]
fn growth_ignored_when_tier_does_not_require_it() {
    let engine = PolicyEngine::new(vec![rule(dec!(100000), dec!(0.5), false)]).unwrap();
    let signals = RiskSignals { growth: dec!(-0.4), ..healthy() };
    assert_eq!(engine.evaluate(&signals, dec!(5000)), Decision::approve());
}

#[test]
fn growth_is_checked_before_volatility() {
    let signals = RiskSignals { growth: dec!(-0.1), cv: dec!(0.8), ..healthy() };
    assert_eq!(engine().evaluate(&signals, dec!(1000)).reason_code, ReasonCode::NegativeGrowth);
}

#[test]
fn volatility_threshold_depends_on_tier() {
    let signals = RiskSignals { cv: dec!(0.30), ..healthy() };
    let engine = engine();
    assert_eq!(engine.evaluate(&signals, dec!(400000)), Decision::approve());
    assert_eq!(
        engine.evaluate(&signals, dec!(600000)),
        Decision::reject(ReasonCode::VolatilityThresholdExceeded)
    );
}

#[test]
fn cv_equal_to_threshold_passes() {
    let signals = RiskSignals { cv: dec!(0.35), ..healthy() };
    assert_eq!(engine().evaluate(&signals, dec!(1000)), Decision::approve());
}

#[test]
fn table_order_is_kept_as_configured() {
    // The wide tier comes first, so it shadows the narrow one.
    let engine = PolicyEngine::new(vec![
        rule(dec!(2000000), dec!(0.10), true),
        rule(dec!(500000), dec!(0.50), true),
    ])
    .unwrap();
    assert_eq!(engine.rules()[0].max_amount, dec!(2000000));
    assert_eq!(
        engine.evaluate(&healthy(), dec!(1000)),
        Decision::reject(ReasonCode::VolatilityThresholdExceeded)
    );
}

#[test]
fn empty_table_fails_at_construction() {
    let err = PolicyEngine::new(Vec::new()).err().expect("empty table rejected");
    assert!(matches!(err, LoanError::InvalidPolicy { .. }));
}

#[test]
fn negative_limits_fail_at_construction() {
    assert!(matches!(
        PolicyEngine::new(vec![rule(dec!(-1), dec!(0.3), true)]),
        Err(LoanError::InvalidPolicy { .. })
    ));
    assert!(matches!(
        PolicyEngine::new(vec![rule(dec!(1000), dec!(-0.3), true)]),
        Err(LoanError::InvalidPolicy { .. })
    ));
}

#[test]
fn reason_codes_serialize_as_stable_strings() {
    let codes = [
        (ReasonCode::Eligible, "ELIGIBLE"),
        (ReasonCode::LoanAmountExceedsPolicyLimit, "LOAN_AMOUNT_EXCEEDS_POLICY_LIMIT"),
        (ReasonCode::LossMaking, "LOSS_MAKING"),
        (ReasonCode::FraudPatternDetected, "FRAUD_PATTERN_DETECTED"),
        (ReasonCode::NegativeGrowth, "NEGATIVE_GROWTH"),
        (ReasonCode::VolatilityThresholdExceeded, "VOLATILITY_THRESHOLD_EXCEEDED"),
        (ReasonCode::CustomerNotFound, "CUSTOMER_NOT_FOUND"),
    ];
    for (code, wire) in codes {
        assert_eq!(serde_json::to_string(&code).unwrap(), format!("\"{wire}\""));
        assert_eq!(code.as_str(), wire);
        let back: ReasonCode = serde_json::from_str(&format!("\"{wire}\"")).unwrap();
        assert_eq!(back, code);
    }
}
