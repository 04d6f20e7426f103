//! Request bodies accepted by the inventory API.
//!
//! The same structs double as the in-memory batch produced by the
//! transaction generators, so direct inserts and API posts share one shape.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status written on every generated transaction.
pub const STATUS_COMPLETED: &str = "completed";

/// Incoming stock from a supplier (`POST /entries`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntryPayload {
    pub supplier_id: i64,
    pub entry_date: DateTime<Utc>,
    pub invoice_number: String,
    pub total_value: f64,
    pub status: String,
    pub items: Vec<EntryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntryItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub lot_number: String,
    pub expiration_date: Option<DateTime<Utc>>,
    pub received_at: DateTime<Utc>,
}

/// Transfer between stores (`POST /internal-distributions`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DistributionPayload {
    pub from_store_id: i64,
    pub to_store_id: i64,
    pub distribution_date: DateTime<Utc>,
    pub status: String,
    pub items: Vec<DistributionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DistributionItem {
    pub product_id: i64,
    pub quantity: i64,
    pub registered_at: DateTime<Utc>,
}

/// How a sale leaves the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Pickup,
    Delivery,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Pickup => "pickup",
            DeliveryType::Delivery => "delivery",
        }
    }
}

/// Checkout at a store (`POST /sales`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SalePayload {
    pub client_id: i64,
    pub store_id: i64,
    pub sale_date: DateTime<Utc>,
    pub delivery_type: DeliveryType,
    pub tracking_code: String,
    pub status: String,
    pub predicted_delivery: DateTime<Utc>,
    pub delivered_at: DateTime<Utc>,
    pub total_value: f64,
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SaleItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub removed_at: DateTime<Utc>,
}
