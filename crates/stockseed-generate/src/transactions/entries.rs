use std::collections::BTreeSet;

use chrono::Duration;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use stockseed_core::{EntryItem, EntryPayload, ProductRef, STATUS_COMPLETED};

use super::TransactionOptions;
use crate::errors::GenerationError;
use crate::rng::round_currency;

/// Which categories carry an expiration date on received lots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationPolicy {
    categories: BTreeSet<i64>,
}

impl ExpirationPolicy {
    pub fn new(categories: impl IntoIterator<Item = i64>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
        }
    }

    pub fn requires_expiration(&self, category_id: i64) -> bool {
        self.categories.contains(&category_id)
    }
}

impl Default for ExpirationPolicy {
    /// Alimentos, Bebidas and Higiene in the built-in catalog.
    fn default() -> Self {
        Self::new([2, 3, 4])
    }
}

/// Builds incoming stock entries from suppliers.
#[derive(Debug, Clone)]
pub struct EntryGenerator<'a> {
    products: &'a [ProductRef],
    suppliers: &'a [i64],
    expiration: ExpirationPolicy,
    options: TransactionOptions,
}

impl<'a> EntryGenerator<'a> {
    pub const MIN_QUANTITY: i64 = 5;
    pub const MAX_QUANTITY: i64 = 100;

    pub fn new(
        products: &'a [ProductRef],
        suppliers: &'a [i64],
        expiration: ExpirationPolicy,
        options: TransactionOptions,
    ) -> Result<Self, GenerationError> {
        if products.is_empty() {
            return Err(GenerationError::Precondition(
                "no products found for stock entries".to_string(),
            ));
        }
        if suppliers.is_empty() {
            return Err(GenerationError::Precondition(
                "no suppliers found for stock entries".to_string(),
            ));
        }
        Ok(Self {
            products,
            suppliers,
            expiration,
            options,
        })
    }

    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<EntryPayload> {
        (0..count).map(|_| self.build_entry(rng)).collect()
    }

    fn build_entry<R: Rng + ?Sized>(&self, rng: &mut R) -> EntryPayload {
        let supplier_id = self.suppliers[rng.random_range(0..self.suppliers.len())];
        let entry_date = self.options.random_past(rng);
        let invoice_number = format!("NF-{}", rng.random_range(100000..=999999));

        let count = self.options.item_count(self.products.len(), rng);
        let selected: Vec<&ProductRef> = self.products.choose_multiple(rng, count).collect();

        let items: Vec<EntryItem> = selected
            .into_iter()
            .map(|product| {
                let quantity = rng.random_range(Self::MIN_QUANTITY..=Self::MAX_QUANTITY);
                let unit_price = product.sale_price;
                let expiration_date =
                    self.expiration
                        .requires_expiration(product.category_id)
                        .then(|| {
                            self.options.reference_time
                                + Duration::days(rng.random_range(90..=720))
                        });

                EntryItem {
                    product_id: product.id,
                    quantity,
                    unit_price,
                    total_price: round_currency(quantity as f64 * unit_price),
                    lot_number: format!("LOT-{:08X}", rng.random::<u32>()),
                    expiration_date,
                    received_at: entry_date,
                }
            })
            .collect();

        let total_value = round_currency(items.iter().map(|item| item.total_price).sum());
        debug!(supplier_id, items = items.len(), total_value, "entry built");

        EntryPayload {
            supplier_id,
            entry_date,
            invoice_number,
            total_value,
            status: STATUS_COMPLETED.to_string(),
            items,
        }
    }
}
