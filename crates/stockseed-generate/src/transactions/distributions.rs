use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use stockseed_core::{DistributionItem, DistributionPayload, STATUS_COMPLETED, StockKey};

use super::{AllocationBatch, TransactionOptions};
use crate::errors::GenerationError;
use crate::ledger::StockLedger;

/// Builds transfers out of the central store without overbooking it.
#[derive(Debug, Clone)]
pub struct DistributionGenerator {
    source_store: i64,
    destinations: Vec<i64>,
    options: TransactionOptions,
}

impl DistributionGenerator {
    /// The lowest store id acts as the central warehouse.
    pub fn new(stores: &[i64], options: TransactionOptions) -> Result<Self, GenerationError> {
        let source_store = stores.iter().copied().min().ok_or_else(|| {
            GenerationError::Precondition("at least two stores are required".to_string())
        })?;
        let mut destinations: Vec<i64> = stores
            .iter()
            .copied()
            .filter(|store| *store != source_store)
            .collect();
        destinations.sort_unstable();
        destinations.dedup();
        if destinations.is_empty() {
            return Err(GenerationError::Precondition(
                "at least two stores are required".to_string(),
            ));
        }

        Ok(Self {
            source_store,
            destinations,
            options,
        })
    }

    pub fn source_store(&self) -> i64 {
        self.source_store
    }

    /// Pools the central store can ship from: its own rows or unscoped rows.
    pub fn is_source_pool(&self, key: &StockKey) -> bool {
        key.store_id.is_none() || key.store_id == Some(self.source_store)
    }

    /// Up to `count` transfers drawn from `ledger`, which is decremented in place.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        ledger: &mut StockLedger,
        count: usize,
        rng: &mut R,
    ) -> Result<AllocationBatch<DistributionPayload>, GenerationError> {
        if ledger.donors_where(|key| self.is_source_pool(key)).is_empty() {
            return Err(GenerationError::Precondition(format!(
                "no stock available at source store {}",
                self.source_store
            )));
        }

        let mut records = Vec::with_capacity(count);
        let mut exhausted = false;

        for _ in 0..count {
            let donors = ledger.donors_where(|key| self.is_source_pool(key));
            if donors.is_empty() {
                exhausted = true;
                break;
            }

            let to_store_id = self.destinations[rng.random_range(0..self.destinations.len())];
            let distribution_date = self.options.random_past(rng);

            let wanted = self.options.item_count(donors.len(), rng);
            let selected: Vec<(StockKey, i64)> =
                donors.choose_multiple(rng, wanted).copied().collect();

            let mut items = Vec::with_capacity(selected.len());
            for (key, available) in selected {
                let quantity = rng.random_range(1..=available);
                ledger.allocate(&key, quantity)?;
                items.push(DistributionItem {
                    product_id: key.product_id,
                    quantity,
                    registered_at: distribution_date,
                });
            }

            debug!(to_store_id, items = items.len(), "distribution built");
            records.push(DistributionPayload {
                from_store_id: self.source_store,
                to_store_id,
                distribution_date,
                status: STATUS_COMPLETED.to_string(),
                items,
            });
        }

        if exhausted {
            info!(
                requested = count,
                generated = records.len(),
                "source stock exhausted, stopping distributions early"
            );
        }

        Ok(AllocationBatch { records, exhausted })
    }
}
