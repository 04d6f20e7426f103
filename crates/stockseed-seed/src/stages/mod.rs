//! Concrete seed stages.
//!
//! Products and clients are always inserted directly. Entries, distributions
//! and sales come in a direct variant (SQL inserts) and an API variant (JSON
//! posts); both share the same generators and allocation policy.

mod clients;
mod distributions;
mod entries;
mod products;
mod sales;

pub use clients::ClientsStage;
pub use distributions::{DistributionsApiStage, DistributionsStage};
pub use entries::{EntriesApiStage, EntriesStage};
pub use products::ProductsStage;
pub use sales::{SalesApiStage, SalesStage};

use std::collections::BTreeMap;

use stockseed_core::{StockKey, StockLevel};

use crate::errors::SeedResult;
use crate::store::{BatchInsert, SeedTransaction, SqlValue};

/// Net stock movement of a direct stage, written once before commit.
#[derive(Debug, Default)]
struct StockChanges {
    deltas: BTreeMap<StockKey, i64>,
}

impl StockChanges {
    fn add(&mut self, store_id: i64, product_id: i64, quantity: i64) {
        *self
            .deltas
            .entry(StockKey::new(Some(store_id), product_id))
            .or_insert(0) += quantity;
    }

    async fn apply(self, tx: &mut dyn SeedTransaction) -> SeedResult<usize> {
        let changes: Vec<StockLevel> = self
            .deltas
            .into_iter()
            .filter(|(_, quantity)| *quantity != 0)
            .map(|(key, quantity)| StockLevel {
                product_id: key.product_id,
                store_id: key.store_id,
                quantity,
            })
            .collect();
        tx.apply_stock_changes(&changes).await?;
        Ok(changes.len())
    }
}

/// Insert a parent row, then its items keyed by the new id.
async fn insert_with_items(
    tx: &mut dyn SeedTransaction,
    parent_table: &'static str,
    parent_columns: &'static [&'static str],
    parent: Vec<SqlValue>,
    mut items: BatchInsert,
    batch_size: usize,
) -> SeedResult<i64> {
    let id = tx
        .insert_returning_id(parent_table, parent_columns, parent)
        .await?;
    for row in &mut items.rows {
        row.insert(0, SqlValue::Int(id));
    }
    tx.insert_rows(&items, batch_size).await?;
    Ok(id)
}
