//! Metrics cache: risk signals memoized per customer.
//!
//! LIFECYCLE:
//!   - Built unloaded around an injected source.
//!   - First `get_signals` call loads the whole source once and computes
//!     signals for every customer present.
//!   - Concurrent first calls block on that single load.
//!   - `reload()` drops the mapping; the next call re-reads the source.
//!
//! Loaded state is tracked by the cell, not by the mapping being
//! non-empty. An empty source is a valid, loaded population.

use crate::{
    error::LoanResult,
    signals::{compute_signals, RiskSignals},
    source::TransactionSource,
    types::CustomerId,
};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

pub type SignalMap = HashMap<CustomerId, RiskSignals>;

pub struct MetricsCache<S> {
    source:  S,
    signals: OnceCell<SignalMap>,
}

impl<S: TransactionSource> MetricsCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            signals: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.signals.get().is_some()
    }

    /// Signals for one customer. `Ok(None)` means the customer is unknown.
    pub fn get_signals(&self, customer_id: &str) -> LoanResult<Option<&RiskSignals>> {
        Ok(self.signals()?.get(customer_id))
    }

    /// Number of customers in the loaded population.
    pub fn customer_count(&self) -> LoanResult<usize> {
        Ok(self.signals()?.len())
    }

    /// The full mapping, loading it on first use.
    pub fn signals(&self) -> LoanResult<&SignalMap> {
        self.signals.get_or_try_init(|| self.load_and_precompute())
    }

    /// Forget every computed signal. The source is re-read on next access.
    pub fn reload(&mut self) {
        if self.signals.take().is_some() {
            log::info!("metrics cache invalidated ({})", self.source.describe());
        }
    }

    fn load_and_precompute(&self) -> LoanResult<SignalMap> {
        let population = self.source.load()?;
        let mut signals = SignalMap::with_capacity(population.len());

        for (customer_id, transactions) in population {
            let customer_signals = compute_signals(&transactions)?;
            log::debug!(
                "signals {customer_id}: growth={} cv={} stability={} fraud={} loss={}",
                customer_signals.growth,
                customer_signals.cv,
                customer_signals.stability,
                customer_signals.fraud_flag,
                customer_signals.loss_flag
            );
            signals.insert(customer_id, customer_signals);
        }

        log::info!(
            "metrics cache loaded {} customers from {}",
            signals.len(),
            self.source.describe()
        );
        Ok(signals)
    }
}
