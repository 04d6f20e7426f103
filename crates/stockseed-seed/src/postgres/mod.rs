use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use stockseed_core::{ProductRef, StockLevel};

use crate::errors::{SeedError, SeedResult};
use crate::store::{BatchInsert, Database, SeedTransaction, SqlValue};

mod queries;

/// Postgres-backed [`Database`].
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Create a database handle from a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> SeedResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Handle that connects on first use; nothing is opened here.
    pub fn connect_lazy(url: &str) -> SeedResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_lazy(url)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PgDatabase {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> SeedResult<Box<dyn SeedTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSeedTransaction { tx: Some(tx) }))
    }
}

/// Open Postgres transaction; `None` once committed or rolled back.
pub struct PgSeedTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSeedTransaction {
    fn tx(&mut self) -> SeedResult<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| SeedError::Configuration("transaction already finished".to_string()))
    }
}

#[async_trait]
impl SeedTransaction for PgSeedTransaction {
    async fn insert_rows(&mut self, insert: &BatchInsert, batch_size: usize) -> SeedResult<u64> {
        let tx = self.tx()?;
        queries::insert_rows(&mut **tx, insert, batch_size).await
    }

    async fn insert_returning_id(
        &mut self,
        table: &'static str,
        columns: &'static [&'static str],
        values: Vec<SqlValue>,
    ) -> SeedResult<i64> {
        let tx = self.tx()?;
        queries::insert_returning_id(&mut **tx, table, columns, values).await
    }

    async fn select_ids(&mut self, table: &'static str) -> SeedResult<Vec<i64>> {
        let tx = self.tx()?;
        queries::select_ids(&mut **tx, table).await
    }

    async fn select_products(&mut self) -> SeedResult<Vec<ProductRef>> {
        let tx = self.tx()?;
        queries::select_products(&mut **tx).await
    }

    async fn select_stock(&mut self) -> SeedResult<Vec<StockLevel>> {
        let tx = self.tx()?;
        queries::select_stock(&mut **tx).await
    }

    async fn apply_stock_changes(&mut self, changes: &[StockLevel]) -> SeedResult<()> {
        let tx = self.tx()?;
        for change in changes {
            queries::apply_stock_change(&mut **tx, change).await?;
        }
        Ok(())
    }

    async fn truncate(&mut self, tables: &[&'static str]) -> SeedResult<()> {
        let tx = self.tx()?;
        for table in tables {
            queries::truncate(&mut **tx, table).await?;
        }
        Ok(())
    }

    async fn commit(&mut self) -> SeedResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(SeedError::Configuration(
                "transaction already finished".to_string(),
            )),
        }
    }

    async fn rollback(&mut self) -> SeedResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.rollback().await?),
            None => Ok(()),
        }
    }
}
