use tracing::{info, warn};

use crate::errors::{SeedError, SeedResult};
use crate::store::Database;

/// Tables `clean` may truncate, children before parents.
pub const CLEANUP_TABLES: &[&str] = &[
    "sale_items",
    "sales",
    "internal_distribution_items",
    "internal_distributions",
    "product_entry_items",
    "product_entries",
    "stock",
    "products",
    "clients",
    "suppliers",
    "stores",
];

/// Validate a table selection against [`CLEANUP_TABLES`].
///
/// An empty selection means every table. The result follows allow-list order.
pub fn select_tables(requested: &[String]) -> SeedResult<Vec<&'static str>> {
    if requested.is_empty() {
        return Ok(CLEANUP_TABLES.to_vec());
    }

    if let Some(unknown) = requested
        .iter()
        .find(|name| !CLEANUP_TABLES.contains(&name.trim()))
    {
        return Err(SeedError::Configuration(format!(
            "table '{unknown}' is not eligible for cleanup"
        )));
    }

    Ok(CLEANUP_TABLES
        .iter()
        .copied()
        .filter(|table| requested.iter().any(|name| name.trim() == *table))
        .collect())
}

/// Truncate `tables` (restarting identities, cascading) in one transaction.
pub async fn truncate_tables(db: &dyn Database, tables: &[&'static str]) -> SeedResult<()> {
    let mut tx = db.begin().await?;
    match tx.truncate(tables).await {
        Ok(()) => {
            tx.commit().await?;
            info!(tables = ?tables, "tables truncated");
            Ok(())
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
