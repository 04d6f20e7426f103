use std::fs;
use std::path::Path;

use stockseed_core::CatalogDefinition;

use crate::errors::GenerationError;
use crate::pricing::price_range;

const DEFAULT_CATALOG: &str = include_str!("../assets/catalog/products_base.json");

/// Built-in catalog covering every priced category.
pub fn default_catalog() -> Result<CatalogDefinition, GenerationError> {
    parse_catalog(DEFAULT_CATALOG)
}

/// Load a catalog file in the `products_base.json` format.
pub fn load_catalog(path: &Path) -> Result<CatalogDefinition, GenerationError> {
    let content = fs::read_to_string(path)?;
    parse_catalog(&content)
}

pub fn parse_catalog(content: &str) -> Result<CatalogDefinition, GenerationError> {
    let catalog: CatalogDefinition = serde_json::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Every category needs a price range; every variation attribute needs values.
pub fn validate_catalog(catalog: &CatalogDefinition) -> Result<(), GenerationError> {
    for (category, subcategories) in catalog.categories.iter() {
        if price_range(category).is_none() {
            return Err(GenerationError::UnknownCategory(category.to_string()));
        }
        for (subcategory, data) in subcategories.iter() {
            if let Some((attribute, _)) = data
                .variations
                .iter()
                .find(|(_, values)| values.is_empty())
            {
                return Err(GenerationError::InvalidCatalog(format!(
                    "{category}/{subcategory}: attribute '{attribute}' has no values"
                )));
            }
        }
    }
    Ok(())
}
