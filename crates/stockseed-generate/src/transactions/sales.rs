use std::collections::HashMap;

use chrono::Duration;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use stockseed_core::{DeliveryType, STATUS_COMPLETED, SaleItem, SalePayload, StockKey};

use super::{AllocationBatch, TransactionOptions};
use crate::errors::GenerationError;
use crate::ledger::StockLedger;
use crate::rng::round_currency;

/// Days between a sale and its (predicted and actual) delivery.
pub const DELIVERY_LEAD_DAYS: i64 = 3;

/// Builds store checkouts without selling more than each store holds.
#[derive(Debug, Clone)]
pub struct SaleGenerator<'a> {
    clients: &'a [i64],
    prices: &'a HashMap<i64, f64>,
    excluded_store: Option<i64>,
    options: TransactionOptions,
}

impl<'a> SaleGenerator<'a> {
    /// `excluded_store` (the central warehouse) never sells directly.
    pub fn new(
        clients: &'a [i64],
        prices: &'a HashMap<i64, f64>,
        excluded_store: Option<i64>,
        options: TransactionOptions,
    ) -> Result<Self, GenerationError> {
        if clients.is_empty() {
            return Err(GenerationError::Precondition(
                "no clients found for sales".to_string(),
            ));
        }
        Ok(Self {
            clients,
            prices,
            excluded_store,
            options,
        })
    }

    /// Pools a sale may draw from: store-scoped, not the excluded store, and
    /// holding a product with a known price.
    pub fn is_sales_pool(&self, key: &StockKey) -> bool {
        key.store_id.is_some()
            && key.store_id != self.excluded_store
            && self.prices.contains_key(&key.product_id)
    }

    /// Up to `count` sales drawn from `ledger`, which is decremented in place.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        ledger: &mut StockLedger,
        count: usize,
        rng: &mut R,
    ) -> Result<AllocationBatch<SalePayload>, GenerationError> {
        if ledger.donors_where(|key| self.is_sales_pool(key)).is_empty() {
            return Err(GenerationError::Precondition(
                "no store has priced stock available for sales".to_string(),
            ));
        }

        let mut records = Vec::with_capacity(count);
        let mut exhausted = false;

        for _ in 0..count {
            let stores = ledger.stores_with_donors(|key| self.is_sales_pool(key));
            let Some(store_id) = stores.choose(rng).copied().flatten() else {
                exhausted = true;
                break;
            };

            let donors: Vec<(StockKey, i64, f64)> = ledger
                .donors_where(|key| key.store_id == Some(store_id))
                .into_iter()
                .filter_map(|(key, available)| {
                    let price = self.prices.get(&key.product_id)?;
                    Some((key, available, *price))
                })
                .collect();
            let wanted = self.options.item_count(donors.len(), rng);
            let selected: Vec<(StockKey, i64, f64)> =
                donors.choose_multiple(rng, wanted).copied().collect();
            let sale_date = self.options.random_past(rng);

            let mut items = Vec::with_capacity(selected.len());
            for (key, available, unit_price) in selected {
                let quantity = rng.random_range(1..=available);
                ledger.allocate(&key, quantity)?;
                items.push(SaleItem {
                    product_id: key.product_id,
                    quantity,
                    unit_price,
                    total_price: round_currency(unit_price * quantity as f64),
                    removed_at: sale_date,
                });
            }

            let total_value = round_currency(items.iter().map(|item| item.total_price).sum());
            let delivery_type = if rng.random_bool(0.5) {
                DeliveryType::Pickup
            } else {
                DeliveryType::Delivery
            };
            let delivered_at = sale_date + Duration::days(DELIVERY_LEAD_DAYS);
            let client_id = self.clients[rng.random_range(0..self.clients.len())];

            debug!(store_id, client_id, items = items.len(), total_value, "sale built");
            records.push(SalePayload {
                client_id,
                store_id,
                sale_date,
                delivery_type,
                tracking_code: format!("TRK-{}", rng.random_range(100000..=999999)),
                status: STATUS_COMPLETED.to_string(),
                predicted_delivery: delivered_at,
                delivered_at,
                total_value,
                items,
            });
        }

        if exhausted {
            info!(
                requested = count,
                generated = records.len(),
                "store stock exhausted, stopping sales early"
            );
        }

        Ok(AllocationBatch { records, exhausted })
    }
}
