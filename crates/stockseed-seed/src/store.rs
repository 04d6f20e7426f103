use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use stockseed_core::{ProductRef, StockLevel};

use crate::errors::SeedResult;

/// A single bound value in a batched insert.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    /// Nullable timestamp; bound with its type so NULL lands in timestamp columns.
    OptionalTimestamp(Option<DateTime<Utc>>),
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<Option<DateTime<Utc>>> for SqlValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        SqlValue::OptionalTimestamp(value)
    }
}

/// Multi-row insert into a fixed table.
///
/// Table and column names are compile-time identifiers; only values are bound.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInsert {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<SqlValue>>,
    /// Conflict clause appended after `ON CONFLICT`, e.g. `(name) DO NOTHING`.
    pub on_conflict: Option<&'static str>,
}

impl BatchInsert {
    pub fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            rows: Vec::new(),
            on_conflict: None,
        }
    }

    pub fn on_conflict(mut self, clause: &'static str) -> Self {
        self.on_conflict = Some(clause);
        self
    }

    pub fn push_row(&mut self, row: Vec<SqlValue>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One unit of work against the target database.
///
/// Everything done through a transaction becomes visible on `commit` and is
/// discarded on `rollback`. Both finish the transaction.
#[async_trait]
pub trait SeedTransaction: Send {
    /// Insert `insert.rows` in chunks of `batch_size`; returns rows written
    /// (rows skipped by the conflict clause are not counted).
    async fn insert_rows(&mut self, insert: &BatchInsert, batch_size: usize) -> SeedResult<u64>;

    /// Insert one parent row and return its generated `id`.
    async fn insert_returning_id(
        &mut self,
        table: &'static str,
        columns: &'static [&'static str],
        values: Vec<SqlValue>,
    ) -> SeedResult<i64>;

    /// All ids of `table`, ascending.
    async fn select_ids(&mut self, table: &'static str) -> SeedResult<Vec<i64>>;

    async fn select_products(&mut self) -> SeedResult<Vec<ProductRef>>;

    async fn select_stock(&mut self) -> SeedResult<Vec<StockLevel>>;

    /// Add each signed `quantity` to its `stock` row, creating rows that do
    /// not exist yet. Keys are expected to be unique within `changes`.
    async fn apply_stock_changes(&mut self, changes: &[StockLevel]) -> SeedResult<()>;

    async fn truncate(&mut self, tables: &[&'static str]) -> SeedResult<()>;

    async fn commit(&mut self) -> SeedResult<()>;

    async fn rollback(&mut self) -> SeedResult<()>;
}

/// Source of units of work.
#[async_trait]
pub trait Database: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    async fn begin(&self) -> SeedResult<Box<dyn SeedTransaction>>;
}
