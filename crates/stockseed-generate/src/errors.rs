use thiserror::Error;

use stockseed_core::StockKey;

/// Errors emitted by the generators.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unknown category '{0}': no price range configured")]
    UnknownCategory(String),
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("missing upstream data: {0}")]
    Precondition(String),
    #[error(
        "overbooking on product {} (store {:?}): requested {requested}, remaining {remaining}",
        key.product_id,
        key.store_id
    )]
    Overbooking {
        key: StockKey,
        requested: i64,
        remaining: i64,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
