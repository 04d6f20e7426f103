use rand::Rng;

use crate::errors::GenerationError;
use crate::rng::round_currency;

/// Sale price bounds for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Cost as a fraction of the sale price.
pub const COST_RATIO_MIN: f64 = 0.6;
pub const COST_RATIO_MAX: f64 = 0.8;

const PRICE_RANGES: &[(&str, PriceRange)] = &[
    ("Eletrônicos", PriceRange { min: 1200.0, max: 4000.0 }),
    ("Informática", PriceRange { min: 80.0, max: 5000.0 }),
    ("Alimentos", PriceRange { min: 5.0, max: 60.0 }),
    ("Bebidas", PriceRange { min: 3.0, max: 15.0 }),
    ("Higiene", PriceRange { min: 6.0, max: 40.0 }),
    ("Limpeza", PriceRange { min: 4.0, max: 50.0 }),
    ("Papelaria", PriceRange { min: 3.0, max: 80.0 }),
    ("Acessórios", PriceRange { min: 15.0, max: 200.0 }),
];

/// Cost/sale pair for a single product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePair {
    pub cost_price: f64,
    pub sale_price: f64,
}

pub fn price_range(category: &str) -> Option<PriceRange> {
    PRICE_RANGES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, range)| *range)
}

pub fn priced_categories() -> impl Iterator<Item = &'static str> {
    PRICE_RANGES.iter().map(|(name, _)| *name)
}

/// Draw a sale price in the category range and a cost 60–80% of it.
pub fn synthesize<R: Rng + ?Sized>(
    category: &str,
    rng: &mut R,
) -> Result<PricePair, GenerationError> {
    let range = price_range(category)
        .ok_or_else(|| GenerationError::UnknownCategory(category.to_string()))?;

    let sale_price = round_currency(rng.random_range(range.min..=range.max));
    let ratio = rng.random_range(COST_RATIO_MIN..=COST_RATIO_MAX);
    let mut cost_price = round_currency(sale_price * ratio);
    if cost_price >= sale_price {
        cost_price = round_currency(sale_price - 0.01);
    }

    Ok(PricePair {
        cost_price,
        sale_price,
    })
}
