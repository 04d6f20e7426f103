use std::collections::BTreeMap;

use stockseed_core::{StockKey, StockLevel};

use crate::errors::GenerationError;

/// Pools at or below this quantity are not offered as donors.
pub const MIN_DONOR_QUANTITY: i64 = 1;

/// Remaining allocatable stock for one generator run.
///
/// Seeded once from an authoritative read and decremented as allocations are
/// emitted, so later transactions in the same run see earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockLedger {
    initial: BTreeMap<StockKey, i64>,
    remaining: BTreeMap<StockKey, i64>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stock rows; non-positive rows are dropped, duplicate keys summed.
    pub fn from_levels<'a>(levels: impl IntoIterator<Item = &'a StockLevel>) -> Self {
        let mut remaining: BTreeMap<StockKey, i64> = BTreeMap::new();
        for level in levels {
            if level.quantity > 0 {
                *remaining.entry(level.key()).or_insert(0) += level.quantity;
            }
        }
        Self {
            initial: remaining.clone(),
            remaining,
        }
    }

    /// Keep only the pools matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&StockKey) -> bool) {
        self.initial.retain(|key, _| keep(key));
        self.remaining.retain(|key, _| keep(key));
    }

    pub fn remaining(&self, key: &StockKey) -> i64 {
        self.remaining.get(key).copied().unwrap_or(0)
    }

    pub fn initial(&self, key: &StockKey) -> i64 {
        self.initial.get(key).copied().unwrap_or(0)
    }

    pub fn allocated(&self, key: &StockKey) -> i64 {
        self.initial(key) - self.remaining(key)
    }

    /// Pools that can still donate (`remaining > 1`) matching `filter`.
    pub fn donors_where(&self, filter: impl Fn(&StockKey) -> bool) -> Vec<(StockKey, i64)> {
        self.remaining
            .iter()
            .filter(|(key, quantity)| **quantity > MIN_DONOR_QUANTITY && filter(key))
            .map(|(key, quantity)| (*key, *quantity))
            .collect()
    }

    /// Distinct stores that still have at least one donor pool.
    pub fn stores_with_donors(&self, filter: impl Fn(&StockKey) -> bool) -> Vec<Option<i64>> {
        let mut stores: Vec<Option<i64>> = self
            .donors_where(filter)
            .into_iter()
            .map(|(key, _)| key.store_id)
            .collect();
        stores.dedup();
        stores
    }

    /// Take `quantity` from a pool; refuses anything that would go negative.
    pub fn allocate(&mut self, key: &StockKey, quantity: i64) -> Result<i64, GenerationError> {
        let remaining = self.remaining(key);
        if quantity <= 0 || quantity > remaining {
            return Err(GenerationError::Overbooking {
                key: *key,
                requested: quantity,
                remaining,
            });
        }
        let left = remaining - quantity;
        self.remaining.insert(*key, left);
        Ok(left)
    }

    pub fn total_remaining(&self) -> i64 {
        self.remaining.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StockKey, &i64)> {
        self.remaining.iter()
    }
}
