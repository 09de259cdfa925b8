//! Loan Desk core: deterministic loan eligibility from transaction history.
//!
//! PIPELINE (fixed, leaf-first):
//!   1. aggregator:   transactions -> monthly credit/debit/net totals
//!   2. signals:      monthly totals -> growth, cv, stability, flags
//!   3. cache:        signals memoized per customer, loaded once
//!   4. rule_engine:  signals + amount + policy table -> decision
//!   5. tool:         customer id + amount -> JSON-safe decision
//!
//! RULE: every monetary value is a `rust_decimal::Decimal`.
//! Binary floats appear only at the tool boundary, and are converted
//! to decimal before any comparison.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod rng;
pub mod rule_engine;
pub mod signals;
pub mod source;
pub mod statement;
pub mod tool;
pub mod transaction;
pub mod types;

pub use cache::MetricsCache;
pub use config::{PolicyConfig, PolicyRule};
pub use error::{LoanError, LoanResult};
pub use rule_engine::{Decision, PolicyEngine, ReasonCode};
pub use signals::{RiskSignals, Stability};
pub use source::{InMemorySource, JsonFileSource, TransactionSource};
pub use tool::{EligibilityTool, ToolCall};
pub use transaction::{Transaction, TransactionKind};
pub use types::{CustomerId, MonthKey};
