use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use stockseed_core::{EntryPayload, StageName};
use stockseed_generate::{EntryGenerator, ExpirationPolicy};

use super::{StockChanges, insert_with_items};
use crate::errors::{SeedError, SeedResult};
use crate::remote::InventoryApi;
use crate::stage::{Stage, StageContext, StageOutput, StageVariant};
use crate::store::{BatchInsert, SeedTransaction};

const ENTRY_COLUMNS: &[&str] = &[
    "supplier_id",
    "entry_date",
    "invoice_number",
    "status",
    "total_value",
];

const ENTRY_ITEM_COLUMNS: &[&str] = &[
    "product_entry_id",
    "product_id",
    "quantity",
    "unit_price",
    "total_price",
    "lot_number",
    "expiration_date",
    "received_at",
];

async fn build_entries(
    tx: &mut dyn SeedTransaction,
    context: &StageContext,
) -> SeedResult<Vec<EntryPayload>> {
    let products = tx.select_products().await?;
    let suppliers = tx.select_ids("suppliers").await?;

    let generator = EntryGenerator::new(
        &products,
        &suppliers,
        ExpirationPolicy::default(),
        context.transaction_options(),
    )?;
    let mut rng = context.rng(StageName::Entries);
    Ok(generator.generate(context.profile.entries_count, &mut rng))
}

/// Stock entries written straight into `product_entries`; received units
/// are added to the central store's `stock` rows.
pub struct EntriesStage {
    context: StageContext,
}

impl EntriesStage {
    pub fn new(context: StageContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Stage for EntriesStage {
    fn name(&self) -> StageName {
        StageName::Entries
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Direct
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let entries = build_entries(tx, &self.context).await?;
        let central_store = tx
            .select_ids("stores")
            .await?
            .into_iter()
            .min()
            .ok_or_else(|| {
                SeedError::Precondition("no stores found to receive stock entries".to_string())
            })?;

        let mut changes = StockChanges::default();
        for entry in &entries {
            let mut items = BatchInsert::new("product_entry_items", ENTRY_ITEM_COLUMNS);
            for item in &entry.items {
                changes.add(central_store, item.product_id, item.quantity);
                items.push_row(vec![
                    item.product_id.into(),
                    item.quantity.into(),
                    item.unit_price.into(),
                    item.total_price.into(),
                    item.lot_number.as_str().into(),
                    item.expiration_date.into(),
                    item.received_at.into(),
                ]);
            }

            let id = insert_with_items(
                tx,
                "product_entries",
                ENTRY_COLUMNS,
                vec![
                    entry.supplier_id.into(),
                    entry.entry_date.into(),
                    entry.invoice_number.as_str().into(),
                    entry.status.as_str().into(),
                    entry.total_value.into(),
                ],
                items,
                self.context.profile.batch_size,
            )
            .await?;
            debug!(entry_id = id, items = entry.items.len(), "entry inserted");
        }

        let pools = changes.apply(tx).await?;
        info!(entries = entries.len(), central_store, pools, "entries persisted");
        Ok(StageOutput::records(entries.len()))
    }
}

/// Stock entries posted to the inventory API.
pub struct EntriesApiStage {
    api: Arc<dyn InventoryApi>,
    context: StageContext,
}

impl EntriesApiStage {
    pub fn new(api: Arc<dyn InventoryApi>, context: StageContext) -> Self {
        Self { api, context }
    }
}

#[async_trait]
impl Stage for EntriesApiStage {
    fn name(&self) -> StageName {
        StageName::Entries
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Api
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let entries = build_entries(tx, &self.context).await?;

        for entry in &entries {
            self.api.post_entry(entry).await?;
            debug!(invoice = %entry.invoice_number, items = entry.items.len(), "entry posted");
        }

        info!(entries = entries.len(), "entries posted");
        Ok(StageOutput::records(entries.len()))
    }
}
