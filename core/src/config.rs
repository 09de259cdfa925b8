//! Policy configuration: the ordered loan tier table.
//!
//! Loaded from `<data_dir>/policy.json`. Order in the file is the order
//! the rule engine walks; nothing here sorts it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const POLICY_FILE: &str = "policy.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub max_amount:              Decimal,
    pub max_cv:                  Decimal,
    pub require_positive_growth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub loan_rules: Vec<PolicyRule>,
}

impl PolicyConfig {
    /// Load the policy table from `data_dir`.
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = data_dir.as_ref().join(POLICY_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let config: PolicyConfig = serde_json::from_str(&content)
            .with_context(|| format!("Malformed policy table in {}", path.display()))?;
        log::debug!("policy: {} tiers from {}", config.loan_rules.len(), path.display());
        Ok(config)
    }

    /// Shipped two-tier table: up to 5L and up to 20L.
    pub fn default_policy() -> Self {
        Self {
            loan_rules: vec![
                PolicyRule {
                    max_amount:              Decimal::new(500_000, 0),
                    max_cv:                  Decimal::new(35, 2),
                    require_positive_growth: true,
                },
                PolicyRule {
                    max_amount:              Decimal::new(2_000_000, 0),
                    max_cv:                  Decimal::new(25, 2),
                    require_positive_growth: true,
                },
            ],
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::default_policy()
    }
}
