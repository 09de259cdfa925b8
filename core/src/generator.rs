//! Synthetic dataset generator: twelve months of history per customer.
//!
//! Profiles:
//!   - stable:    flat inflow/outflow with small noise
//!   - growing:   inflow +5%/month, outflow +4%/month
//!   - declining: inflow and outflow -5%/month
//!   - fraud:     occasional inflow spikes and bursts of micro debits
//!
//! Output is the same JSON the `JsonFileSource` reads.

use crate::{
    error::{LoanError, LoanResult},
    rng::GeneratorRng,
    source::{CustomerRecord, DatasetFile, InMemorySource, TransactionSet},
    transaction::{Transaction, TransactionKind, TransactionRecord},
    types::CustomerId,
};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

const MONTHS_PER_YEAR: u32 = 12;
const FRAUD_SPIKE_PROBABILITY: f64 = 0.35;
const MICRO_BURST_PROBABILITY: f64 = 0.50;
const MICRO_BURST_COUNT: i64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Stable,
    Growing,
    Declining,
    Fraud,
}

impl Profile {
    pub const ALL: [Profile; 4] = [Self::Stable, Self::Growing, Self::Declining, Self::Fraud];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable    => "stable",
            Self::Growing   => "growing",
            Self::Declining => "declining",
            Self::Fraud     => "fraud",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = LoanError;

    fn from_str(s: &str) -> LoanResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| LoanError::UnknownProfile { name: s.to_string() })
    }
}

// ── Amount helpers ───────────────────────────────────────────────────────────

fn cents(value: Decimal) -> Decimal {
    value.round_dp(2)
}

fn percent(points: i64) -> Decimal {
    Decimal::new(points, 2)
}

/// Split `total` into `count` random parts that sum exactly to `total`.
///
/// Parts are rounded to cents; the rounding remainder lands on the last part.
pub fn distribute_amount(total: Decimal, count: usize, rng: &mut GeneratorRng) -> Vec<Decimal> {
    match count {
        0 => return Vec::new(),
        1 => return vec![total],
        _ => {}
    }

    let weights: Vec<i64> = (0..count).map(|_| rng.int_in(1, 100)).collect();
    let total_weight = Decimal::from(weights.iter().sum::<i64>());

    let mut amounts: Vec<Decimal> = weights
        .iter()
        .map(|&w| cents(Decimal::from(w) / total_weight * total))
        .collect();

    let diff = total - amounts.iter().copied().sum::<Decimal>();
    if let Some(last) = amounts.last_mut() {
        *last += diff;
    }
    amounts
}

// ── Profile generator ────────────────────────────────────────────────────────

pub struct ProfileGenerator {
    customer_id: CustomerId,
    year:        i32,
}

impl ProfileGenerator {
    pub fn new(customer_id: impl Into<CustomerId>, year: i32) -> Self {
        Self {
            customer_id: customer_id.into(),
            year,
        }
    }

    pub fn generate(&self, profile: Profile, rng: &mut GeneratorRng) -> Vec<Transaction> {
        match profile {
            Profile::Stable    => self.stable(rng),
            Profile::Growing   => self.growing(rng),
            Profile::Declining => self.declining(rng),
            Profile::Fraud     => self.fraud(rng),
        }
    }

    fn push_split(
        &self,
        out: &mut Vec<Transaction>,
        month: u32,
        total: Decimal,
        count: i64,
        kind: TransactionKind,
        rng: &mut GeneratorRng,
    ) {
        for amount in distribute_amount(total, count as usize, rng) {
            out.push(Transaction::new(self.customer_id.clone(), self.year, month, amount, kind));
        }
    }

    fn stable(&self, rng: &mut GeneratorRng) -> Vec<Transaction> {
        let avg_inflow = Decimal::new(500_000, 0);
        let avg_outflow = Decimal::new(400_000, 0);
        let mut txns = Vec::new();

        for month in 1..=MONTHS_PER_YEAR {
            let inflow = cents(avg_inflow * (Decimal::ONE + percent(rng.int_in(-5, 5))));
            let credit_count = rng.int_in(10, 20);
            self.push_split(&mut txns, month, inflow, credit_count, TransactionKind::Credit, rng);

            let outflow = cents(avg_outflow * (Decimal::ONE + percent(rng.int_in(-2, 2))));
            let debit_count = rng.int_in(15, 25);
            self.push_split(&mut txns, month, outflow, debit_count, TransactionKind::Debit, rng);
        }
        txns
    }

    fn growing(&self, rng: &mut GeneratorRng) -> Vec<Transaction> {
        let base_inflow = Decimal::new(300_000, 0);
        let base_outflow = Decimal::new(200_000, 0);
        let monthly_growth = percent(5);
        // outflow grows at 80% of the inflow rate
        let outflow_growth = monthly_growth * Decimal::new(8, 1);
        let mut txns = Vec::new();

        for month in 1..=MONTHS_PER_YEAR {
            let periods = u64::from(month - 1);
            let inflow = cents(base_inflow * (Decimal::ONE + monthly_growth).powu(periods));
            let outflow = cents(base_outflow * (Decimal::ONE + outflow_growth).powu(periods));

            let credit_count = rng.int_in(12, 22);
            let debit_count = rng.int_in(15, 28);
            self.push_split(&mut txns, month, inflow, credit_count, TransactionKind::Credit, rng);
            self.push_split(&mut txns, month, outflow, debit_count, TransactionKind::Debit, rng);
        }
        txns
    }

    fn declining(&self, rng: &mut GeneratorRng) -> Vec<Transaction> {
        let base_inflow = Decimal::new(600_000, 0);
        let base_outflow = Decimal::new(500_000, 0);
        let decay = Decimal::ONE - percent(5);
        let mut txns = Vec::new();

        for month in 1..=MONTHS_PER_YEAR {
            let factor = decay.powu(u64::from(month - 1));
            let inflow = cents(base_inflow * factor);
            let outflow = cents(base_outflow * factor);

            let credit_count = rng.int_in(8, 18);
            let debit_count = rng.int_in(12, 22);
            self.push_split(&mut txns, month, inflow, credit_count, TransactionKind::Credit, rng);
            self.push_split(&mut txns, month, outflow, debit_count, TransactionKind::Debit, rng);
        }
        txns
    }

    fn fraud(&self, rng: &mut GeneratorRng) -> Vec<Transaction> {
        let baseline_inflow = Decimal::new(200_000, 0);
        let baseline_outflow = Decimal::new(180_000, 0);
        let micro_total = Decimal::new(5_000, 0);
        let mut txns = Vec::new();

        for month in 1..=MONTHS_PER_YEAR {
            let mut inflow = baseline_inflow;
            if rng.chance(FRAUD_SPIKE_PROBABILITY) {
                inflow *= Decimal::from(rng.int_in(3, 8));
            }

            let credit_count = rng.int_in(5, 15);
            let debit_count = rng.int_in(20, 40);

            if rng.chance(MICRO_BURST_PROBABILITY) {
                self.push_split(
                    &mut txns,
                    month,
                    micro_total,
                    MICRO_BURST_COUNT,
                    TransactionKind::DebitMicro,
                    rng,
                );
            }

            self.push_split(&mut txns, month, inflow, credit_count, TransactionKind::Credit, rng);
            self.push_split(&mut txns, month, baseline_outflow, debit_count, TransactionKind::Debit, rng);
        }
        txns
    }
}

// ── Dataset ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCustomer {
    pub profile:      Profile,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub customers: BTreeMap<CustomerId, GeneratedCustomer>,
}

impl Dataset {
    pub fn transaction_count(&self) -> usize {
        self.customers.values().map(|c| c.transactions.len()).sum()
    }

    /// File form, with amounts as decimal strings.
    pub fn to_file(&self) -> DatasetFile {
        self.customers
            .iter()
            .map(|(id, customer)| {
                let record = CustomerRecord {
                    profile:      Some(customer.profile.as_str().to_string()),
                    transactions: customer.transactions.iter().map(TransactionRecord::from).collect(),
                };
                (id.clone(), record)
            })
            .collect()
    }

    pub fn to_json(&self) -> LoanResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> LoanResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!(
            "dataset: {} customers, {} transactions written to {}",
            self.customers.len(),
            self.transaction_count(),
            path.display()
        );
        Ok(())
    }

    pub fn into_source(self) -> InMemorySource {
        let set: TransactionSet = self
            .customers
            .into_iter()
            .map(|(id, customer)| (id, customer.transactions))
            .collect();
        InMemorySource::new(set)
    }
}

/// Stable customer id for a 1-based index: `cust_001`, `cust_002`, ...
pub fn customer_id_for(index: usize) -> CustomerId {
    format!("cust_{index:03}")
}

/// Generate `num_customers` customers with seeded random profiles.
pub fn generate_dataset(num_customers: usize, year: i32, seed: u64) -> Dataset {
    let mut dataset = Dataset::default();

    for index in 1..=num_customers {
        let mut rng = GeneratorRng::new(seed, index as u64);
        let profile = Profile::ALL[rng.next_u64_below(Profile::ALL.len() as u64) as usize];
        let customer_id = customer_id_for(index);

        let transactions = ProfileGenerator::new(customer_id.clone(), year).generate(profile, &mut rng);
        log::debug!(
            "generated {} transactions for {customer_id} with profile {profile}",
            transactions.len()
        );
        dataset
            .customers
            .insert(customer_id, GeneratedCustomer { profile, transactions });
    }

    dataset
}
