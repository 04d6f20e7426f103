use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Product row built in memory before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateProduct {
    pub name: String,
    pub description: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub date_added: NaiveDate,
    pub active: bool,
    /// 1-based catalog position of the category.
    pub category_id: i64,
}

/// Client row built in memory before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateClient {
    pub name: String,
    pub cpf_cnpj: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Persisted product as read back for pricing entries and sales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
    pub sale_price: f64,
    pub category_id: i64,
}

/// One row of available stock, from the API or the `stock` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StockLevel {
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<i64>,
    pub quantity: i64,
}

impl StockLevel {
    pub fn key(&self) -> StockKey {
        StockKey {
            store_id: self.store_id,
            product_id: self.product_id,
        }
    }
}

/// Identity of a stock pool: a product, optionally scoped to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub store_id: Option<i64>,
    pub product_id: i64,
}

impl StockKey {
    pub fn new(store_id: Option<i64>, product_id: i64) -> Self {
        Self {
            store_id,
            product_id,
        }
    }
}
