//! Price snapshots shared between the feed and the account.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::instrument;

/// PriceSnapshot maps each symbol to its latest simulated price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    prices: BTreeMap<String, Decimal>,
    /// Monotonic tick counter; 0 is the initial snapshot.
    pub sequence: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Creates an empty snapshot.
    pub fn empty() -> Self {
        Self {
            prices: BTreeMap::new(),
            sequence: 0,
            timestamp: super::now(),
        }
    }

    /// Snapshot of every instrument at its initial price.
    pub fn initial() -> Self {
        let mut snapshot = Self::empty();
        for inst in instrument::all() {
            snapshot.set(inst.symbol, inst.initial_price);
        }
        snapshot
    }

    /// Returns the price for a symbol, if quoted.
    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    /// Sets the price for a symbol.
    pub fn set(&mut self, symbol: impl Into<String>, price: Decimal) {
        self.prices.insert(symbol.into(), price);
    }

    /// Builder-style variant of [`PriceSnapshot::set`].
    pub fn with_price(mut self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.set(symbol, price);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.prices.iter().map(|(s, p)| (s.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for PriceSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
