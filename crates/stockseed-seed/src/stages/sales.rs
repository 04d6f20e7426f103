use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use stockseed_core::{SalePayload, StageName, StockLevel};
use stockseed_generate::{AllocationBatch, SaleGenerator, StockLedger};

use super::{StockChanges, insert_with_items};
use crate::errors::SeedResult;
use crate::remote::InventoryApi;
use crate::stage::{Stage, StageContext, StageOutput, StageVariant};
use crate::store::{BatchInsert, SeedTransaction};

const SALE_COLUMNS: &[&str] = &["client_id", "store_id", "sale_date", "status"];

const SALE_ITEM_COLUMNS: &[&str] = &[
    "sale_id",
    "product_id",
    "quantity",
    "unit_price",
    "total_price",
];

/// References a sale draws on, read from the database.
struct SaleInputs {
    clients: Vec<i64>,
    prices: HashMap<i64, f64>,
    central_store: Option<i64>,
}

async fn load_inputs(tx: &mut dyn SeedTransaction) -> SeedResult<SaleInputs> {
    let clients = tx.select_ids("clients").await?;
    let prices = tx
        .select_products()
        .await?
        .into_iter()
        .map(|product| (product.id, product.sale_price))
        .collect();
    let central_store = tx.select_ids("stores").await?.into_iter().min();
    Ok(SaleInputs {
        clients,
        prices,
        central_store,
    })
}

/// Checkouts at the branch stores; the central store never sells.
fn build_sales(
    inputs: &SaleInputs,
    stock: &[StockLevel],
    context: &StageContext,
) -> SeedResult<AllocationBatch<SalePayload>> {
    let generator = SaleGenerator::new(
        &inputs.clients,
        &inputs.prices,
        inputs.central_store,
        context.transaction_options(),
    )?;
    let mut ledger = StockLedger::from_levels(stock);
    ledger.retain(|key| generator.is_sales_pool(key));

    info!(
        pools = ledger.len(),
        available = ledger.total_remaining(),
        "sales ledger loaded"
    );

    let mut rng = context.rng(StageName::Sales);
    Ok(generator.generate(&mut ledger, context.profile.sales_count, &mut rng)?)
}

/// Sales written straight into `sales`, using the `stock` table as the ledger
/// source and deducting the sold units from it.
pub struct SalesStage {
    context: StageContext,
}

impl SalesStage {
    pub fn new(context: StageContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Stage for SalesStage {
    fn name(&self) -> StageName {
        StageName::Sales
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Direct
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let inputs = load_inputs(tx).await?;
        let stock = tx.select_stock().await?;
        let batch = build_sales(&inputs, &stock, &self.context)?;

        let mut changes = StockChanges::default();
        for sale in &batch.records {
            let mut items = BatchInsert::new("sale_items", SALE_ITEM_COLUMNS);
            for item in &sale.items {
                changes.add(sale.store_id, item.product_id, -item.quantity);
                items.push_row(vec![
                    item.product_id.into(),
                    item.quantity.into(),
                    item.unit_price.into(),
                    item.total_price.into(),
                ]);
            }

            let id = insert_with_items(
                tx,
                "sales",
                SALE_COLUMNS,
                vec![
                    sale.client_id.into(),
                    sale.store_id.into(),
                    sale.sale_date.into(),
                    sale.status.as_str().into(),
                ],
                items,
                self.context.profile.batch_size,
            )
            .await?;
            debug!(sale_id = id, items = sale.items.len(), "sale inserted");
        }

        let pools = changes.apply(tx).await?;
        info!(sales = batch.len(), exhausted = batch.exhausted, pools, "sales persisted");
        Ok(StageOutput {
            records: batch.len(),
            exhausted: batch.exhausted,
        })
    }
}

/// Sales posted to the inventory API, using its stock as the ledger.
pub struct SalesApiStage {
    api: Arc<dyn InventoryApi>,
    context: StageContext,
}

impl SalesApiStage {
    pub fn new(api: Arc<dyn InventoryApi>, context: StageContext) -> Self {
        Self { api, context }
    }
}

#[async_trait]
impl Stage for SalesApiStage {
    fn name(&self) -> StageName {
        StageName::Sales
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Api
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let stock = self.api.fetch_stock().await?;
        let inputs = load_inputs(tx).await?;
        let batch = build_sales(&inputs, &stock, &self.context)?;

        for sale in &batch.records {
            self.api.post_sale(sale).await?;
            debug!(
                store_id = sale.store_id,
                tracking_code = %sale.tracking_code,
                items = sale.items.len(),
                "sale posted"
            );
        }

        info!(sales = batch.len(), exhausted = batch.exhausted, "sales posted");
        Ok(StageOutput {
            records: batch.len(),
            exhausted: batch.exhausted,
        })
    }
}
