use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use stockseed_core::{CandidateProduct, CatalogDefinition};

use crate::catalog::validate_catalog;
use crate::errors::GenerationError;
use crate::pricing::synthesize;
use crate::variations::{Combination, expand, format_product_name};

/// Options for product generation.
#[derive(Debug, Clone)]
pub struct ProductOptions {
    /// Cap on combinations expanded per subcategory.
    pub max_variations_per_product: usize,
    /// `date_added` is drawn from the `history_days` before this date.
    pub reference_date: NaiveDate,
    pub history_days: i64,
}

impl Default for ProductOptions {
    fn default() -> Self {
        Self {
            max_variations_per_product: 40,
            reference_date: Utc::now().date_naive(),
            history_days: 180,
        }
    }
}

/// Builds candidate products from a catalog.
#[derive(Debug, Clone)]
pub struct ProductGenerator<'a> {
    catalog: &'a CatalogDefinition,
    options: ProductOptions,
}

impl<'a> ProductGenerator<'a> {
    pub fn new(
        catalog: &'a CatalogDefinition,
        options: ProductOptions,
    ) -> Result<Self, GenerationError> {
        validate_catalog(catalog)?;
        Ok(Self { catalog, options })
    }

    /// Up to `target` products, spread evenly across categories and shuffled.
    ///
    /// Returns fewer than `target` when the catalog runs out of combinations.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        target: usize,
        rng: &mut R,
    ) -> Result<Vec<CandidateProduct>, GenerationError> {
        let categories = self.catalog.category_count();
        if target == 0 || categories == 0 {
            return Ok(Vec::new());
        }

        let per_category = (target / categories).max(1);
        let mut products: Vec<CandidateProduct> = Vec::new();

        for (index, (category, subcategories)) in self.catalog.categories.iter().enumerate() {
            let category_id = index as i64 + 1;
            let mut category_products: Vec<CandidateProduct> = Vec::new();

            'subcategories: for subcategory in subcategories.values() {
                let combinations: Vec<Combination<'_>> =
                    expand(&subcategory.variations, self.options.max_variations_per_product)
                        .collect();

                for base_name in &subcategory.base_products {
                    for combination in &combinations {
                        let product =
                            self.build_product(base_name, combination, category, category_id, rng)?;
                        category_products.push(product);
                        if category_products.len() >= per_category {
                            break 'subcategories;
                        }
                    }
                }
            }

            debug!(
                category = %category,
                category_id,
                products = category_products.len(),
                "category expanded"
            );
            products.extend(category_products);

            if products.len() >= target {
                break;
            }
        }

        products.shuffle(rng);
        products.truncate(target);
        Ok(products)
    }

    fn build_product<R: Rng + ?Sized>(
        &self,
        base_name: &str,
        combination: &Combination<'_>,
        category: &str,
        category_id: i64,
        rng: &mut R,
    ) -> Result<CandidateProduct, GenerationError> {
        let prices = synthesize(category, rng)?;
        let days_back = rng.random_range(0..=self.options.history_days.max(0));
        let name = format_product_name(base_name, combination);

        Ok(CandidateProduct {
            description: format!("Produto {name}"),
            name,
            cost_price: prices.cost_price,
            sale_price: prices.sale_price,
            date_added: self.options.reference_date - Duration::days(days_back),
            active: false,
            category_id,
        })
    }
}
