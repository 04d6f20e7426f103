use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use stockseed_core::{DistributionPayload, StageName, StockLevel};
use stockseed_generate::{AllocationBatch, DistributionGenerator, StockLedger};

use super::{StockChanges, insert_with_items};
use crate::errors::SeedResult;
use crate::remote::InventoryApi;
use crate::stage::{Stage, StageContext, StageOutput, StageVariant};
use crate::store::{BatchInsert, SeedTransaction};

const DISTRIBUTION_COLUMNS: &[&str] = &[
    "from_store_id",
    "to_store_id",
    "distribution_date",
    "status",
];

const DISTRIBUTION_ITEM_COLUMNS: &[&str] = &["internal_distribution_id", "product_id", "quantity"];

/// Transfers out of the central store, bounded by its current stock.
fn build_distributions(
    stores: &[i64],
    stock: &[StockLevel],
    context: &StageContext,
) -> SeedResult<AllocationBatch<DistributionPayload>> {
    let generator = DistributionGenerator::new(stores, context.transaction_options())?;
    let mut ledger = StockLedger::from_levels(stock);
    ledger.retain(|key| generator.is_source_pool(key));

    info!(
        source_store = generator.source_store(),
        pools = ledger.len(),
        available = ledger.total_remaining(),
        "distribution ledger loaded"
    );

    let mut rng = context.rng(StageName::Distributions);
    Ok(generator.generate(&mut ledger, context.profile.distributions_count, &mut rng)?)
}

/// Distributions written straight into `internal_distributions`, using the
/// `stock` table as the ledger source and moving the shipped units in it.
pub struct DistributionsStage {
    context: StageContext,
}

impl DistributionsStage {
    pub fn new(context: StageContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Stage for DistributionsStage {
    fn name(&self) -> StageName {
        StageName::Distributions
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Direct
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let stores = tx.select_ids("stores").await?;
        let stock: Vec<StockLevel> = tx
            .select_stock()
            .await?
            .into_iter()
            .filter(|level| level.store_id.is_some())
            .collect();
        let batch = build_distributions(&stores, &stock, &self.context)?;

        let mut changes = StockChanges::default();
        for distribution in &batch.records {
            let mut items =
                BatchInsert::new("internal_distribution_items", DISTRIBUTION_ITEM_COLUMNS);
            for item in &distribution.items {
                changes.add(distribution.from_store_id, item.product_id, -item.quantity);
                changes.add(distribution.to_store_id, item.product_id, item.quantity);
                items.push_row(vec![item.product_id.into(), item.quantity.into()]);
            }

            let id = insert_with_items(
                tx,
                "internal_distributions",
                DISTRIBUTION_COLUMNS,
                vec![
                    distribution.from_store_id.into(),
                    distribution.to_store_id.into(),
                    distribution.distribution_date.into(),
                    distribution.status.as_str().into(),
                ],
                items,
                self.context.profile.batch_size,
            )
            .await?;
            debug!(distribution_id = id, items = distribution.items.len(), "distribution inserted");
        }

        let pools = changes.apply(tx).await?;
        info!(
            distributions = batch.len(),
            exhausted = batch.exhausted,
            pools,
            "distributions persisted"
        );
        Ok(StageOutput {
            records: batch.len(),
            exhausted: batch.exhausted,
        })
    }
}

/// Distributions posted to the inventory API, using its stock as the ledger.
pub struct DistributionsApiStage {
    api: Arc<dyn InventoryApi>,
    context: StageContext,
}

impl DistributionsApiStage {
    pub fn new(api: Arc<dyn InventoryApi>, context: StageContext) -> Self {
        Self { api, context }
    }
}

#[async_trait]
impl Stage for DistributionsApiStage {
    fn name(&self) -> StageName {
        StageName::Distributions
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Api
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let stock = self.api.fetch_stock().await?;
        let stores = tx.select_ids("stores").await?;
        let batch = build_distributions(&stores, &stock, &self.context)?;

        for distribution in &batch.records {
            self.api.post_distribution(distribution).await?;
            debug!(
                to_store_id = distribution.to_store_id,
                items = distribution.items.len(),
                "distribution posted"
            );
        }

        info!(distributions = batch.len(), exhausted = batch.exhausted, "distributions posted");
        Ok(StageOutput {
            records: batch.len(),
            exhausted: batch.exhausted,
        })
    }
}
