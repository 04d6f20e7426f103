//! Batch generators for stock entries, inter-store distributions and sales.
//!
//! Entries add stock; distributions and sales consume it through a
//! [`StockLedger`](crate::ledger::StockLedger) owned by the caller.

mod distributions;
mod entries;
mod sales;

pub use distributions::DistributionGenerator;
pub use entries::{EntryGenerator, ExpirationPolicy};
pub use sales::SaleGenerator;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Options shared by the transaction generators.
#[derive(Debug, Clone)]
pub struct TransactionOptions {
    /// Transaction dates are drawn from the `history_days` before this instant.
    pub reference_time: DateTime<Utc>,
    pub history_days: i64,
    /// Line items per transaction, inclusive.
    pub min_items: usize,
    pub max_items: usize,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            reference_time: Utc::now(),
            history_days: 180,
            min_items: 1,
            max_items: 10,
        }
    }
}

impl TransactionOptions {
    pub(crate) fn random_past<R: Rng + ?Sized>(&self, rng: &mut R) -> DateTime<Utc> {
        let days = rng.random_range(0..=self.history_days.max(0));
        self.reference_time - Duration::days(days)
    }

    /// Line-item count for one transaction, never above `available`.
    pub(crate) fn item_count<R: Rng + ?Sized>(&self, available: usize, rng: &mut R) -> usize {
        let min = self.min_items.max(1);
        let max = self.max_items.max(min);
        rng.random_range(min..=max).min(available)
    }
}

/// Transactions produced by a consuming generator.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationBatch<T> {
    pub records: Vec<T>,
    /// Set when stock ran out before the requested count was reached.
    pub exhausted: bool,
}

impl<T> AllocationBatch<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
