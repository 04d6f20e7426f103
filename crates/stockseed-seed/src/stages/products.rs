use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use stockseed_core::{CatalogDefinition, StageName};
use stockseed_generate::ProductGenerator;

use crate::errors::SeedResult;
use crate::stage::{Stage, StageContext, StageOutput, StageVariant};
use crate::store::{BatchInsert, SeedTransaction};

const PRODUCT_COLUMNS: &[&str] = &[
    "name",
    "description",
    "cost_price",
    "sale_price",
    "date_added",
    "active",
    "category_id",
];

/// Inserts catalog products; duplicate names are skipped.
pub struct ProductsStage {
    catalog: Arc<CatalogDefinition>,
    context: StageContext,
}

impl ProductsStage {
    pub fn new(catalog: Arc<CatalogDefinition>, context: StageContext) -> Self {
        Self { catalog, context }
    }

    fn build_insert(&self) -> SeedResult<BatchInsert> {
        let generator = ProductGenerator::new(&self.catalog, self.context.product_options())?;
        let mut rng = self.context.rng(StageName::Products);
        let products = generator.generate(self.context.profile.products_count, &mut rng)?;

        let mut insert =
            BatchInsert::new("products", PRODUCT_COLUMNS).on_conflict("(name) DO NOTHING");
        for product in products {
            insert.push_row(vec![
                product.name.into(),
                product.description.into(),
                product.cost_price.into(),
                product.sale_price.into(),
                product.date_added.into(),
                product.active.into(),
                product.category_id.into(),
            ]);
        }
        Ok(insert)
    }
}

#[async_trait]
impl Stage for ProductsStage {
    fn name(&self) -> StageName {
        StageName::Products
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Direct
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let insert = self.build_insert()?;
        let written = tx
            .insert_rows(&insert, self.context.profile.batch_size)
            .await?;
        let total = tx.select_ids("products").await?.len();

        info!(
            generated = insert.len(),
            written,
            skipped = (insert.len() as u64).saturating_sub(written),
            total,
            "products persisted"
        );
        Ok(StageOutput::records(written as usize))
    }
}
