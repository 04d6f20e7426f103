#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use stockseed_core::{
    DistributionPayload, EntryPayload, ProductRef, SalePayload, StockLevel,
};
use stockseed_seed::{
    BatchInsert, Database, InventoryApi, SeedError, SeedResult, SeedTransaction, SqlValue,
};

/// Rows of one in-memory table; ids are 1-based row positions.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl MemoryTable {
    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| *column == name)
    }

    fn value(&self, row: &[SqlValue], name: &str) -> Option<SqlValue> {
        self.column(name).and_then(|index| row.get(index).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub tables: BTreeMap<&'static str, MemoryTable>,
    pub stock: Vec<StockLevel>,
}

#[derive(Debug, Default)]
pub struct Shared {
    pub state: Mutex<MemoryState>,
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

/// [`Database`] double that applies writes on commit only.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    shared: Arc<Shared>,
}

impl MemoryDatabase {
    /// Stores 1..=stores and suppliers 1..=suppliers, no stock rows.
    pub fn with_references(stores: usize, suppliers: usize) -> Self {
        let db = Self::default();
        {
            let mut state = db.shared.state.lock().expect("state lock");
            state.tables.insert("stores", placeholder_rows(stores));
            state.tables.insert("suppliers", placeholder_rows(suppliers));
        }
        db
    }

    pub fn handle(&self) -> Arc<dyn Database> {
        Arc::new(self.clone())
    }

    pub fn set_stock(&self, stock: Vec<StockLevel>) {
        self.shared.state.lock().expect("state lock").stock = stock;
    }

    pub fn stock(&self) -> Vec<StockLevel> {
        self.shared.state.lock().expect("state lock").stock.clone()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.shared
            .state
            .lock()
            .expect("state lock")
            .tables
            .get(table)
            .map(|table| table.rows.len())
            .unwrap_or(0)
    }

    pub fn rows(&self, table: &str) -> Vec<Vec<SqlValue>> {
        self.shared
            .state
            .lock()
            .expect("state lock")
            .tables
            .get(table)
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    pub fn begins(&self) -> usize {
        self.shared.begins.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.shared.rollbacks.load(Ordering::SeqCst)
    }
}

fn placeholder_rows(count: usize) -> MemoryTable {
    MemoryTable {
        columns: vec!["name"],
        rows: (1..=count)
            .map(|index| vec![SqlValue::Text(format!("row {index}"))])
            .collect(),
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> SeedResult<Box<dyn SeedTransaction>> {
        self.shared.begins.fetch_add(1, Ordering::SeqCst);
        let working = self.shared.state.lock().expect("state lock").clone();
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            working,
        }))
    }
}

pub struct MemoryTransaction {
    shared: Arc<Shared>,
    working: MemoryState,
}

impl MemoryTransaction {
    fn table(&mut self, name: &'static str) -> &mut MemoryTable {
        self.working.tables.entry(name).or_default()
    }
}

/// Column named in an `ON CONFLICT (<column>) DO NOTHING` clause.
fn conflict_column(clause: &str) -> Option<&str> {
    let start = clause.find('(')?;
    let end = clause.find(')')?;
    Some(clause[start + 1..end].trim())
}

#[async_trait]
impl SeedTransaction for MemoryTransaction {
    async fn insert_rows(&mut self, insert: &BatchInsert, batch_size: usize) -> SeedResult<u64> {
        if batch_size == 0 {
            return Err(SeedError::Configuration("batch_size must be greater than zero".into()));
        }
        let table = self.table(insert.table);
        if table.columns.is_empty() {
            table.columns = insert.columns.to_vec();
        }

        let conflict = insert.on_conflict.and_then(conflict_column);
        let mut written = 0;
        for row in &insert.rows {
            if let Some(column) = conflict {
                let candidate = insert
                    .columns
                    .iter()
                    .position(|name| *name == column)
                    .and_then(|index| row.get(index));
                let duplicate = table
                    .rows
                    .iter()
                    .any(|existing| table.value(existing, column).as_ref() == candidate);
                if duplicate {
                    continue;
                }
            }
            table.rows.push(row.clone());
            written += 1;
        }
        Ok(written)
    }

    async fn insert_returning_id(
        &mut self,
        table: &'static str,
        columns: &'static [&'static str],
        values: Vec<SqlValue>,
    ) -> SeedResult<i64> {
        let table = self.table(table);
        if table.columns.is_empty() {
            table.columns = columns.to_vec();
        }
        table.rows.push(values);
        Ok(table.rows.len() as i64)
    }

    async fn select_ids(&mut self, table: &'static str) -> SeedResult<Vec<i64>> {
        let count = self
            .working
            .tables
            .get(table)
            .map(|table| table.rows.len())
            .unwrap_or(0);
        Ok((1..=count as i64).collect())
    }

    async fn select_products(&mut self) -> SeedResult<Vec<ProductRef>> {
        let Some(table) = self.working.tables.get("products") else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                match (
                    table.value(row, "sale_price"),
                    table.value(row, "category_id"),
                ) {
                    (Some(SqlValue::Float(sale_price)), Some(SqlValue::Int(category_id))) => {
                        Some(ProductRef {
                            id: index as i64 + 1,
                            sale_price,
                            category_id,
                        })
                    }
                    _ => None,
                }
            })
            .collect())
    }

    async fn select_stock(&mut self) -> SeedResult<Vec<StockLevel>> {
        Ok(self.working.stock.clone())
    }

    async fn apply_stock_changes(&mut self, changes: &[StockLevel]) -> SeedResult<()> {
        for change in changes {
            match self
                .working
                .stock
                .iter_mut()
                .find(|level| level.key() == change.key())
            {
                Some(level) => level.quantity += change.quantity,
                None => self.working.stock.push(*change),
            }
        }
        Ok(())
    }

    async fn truncate(&mut self, tables: &[&'static str]) -> SeedResult<()> {
        for table in tables {
            if *table == "stock" {
                self.working.stock.clear();
            }
            self.working.tables.remove(table);
        }
        Ok(())
    }

    async fn commit(&mut self) -> SeedResult<()> {
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        *self.shared.state.lock().expect("state lock") = self.working.clone();
        Ok(())
    }

    async fn rollback(&mut self) -> SeedResult<()> {
        self.shared.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// [`InventoryApi`] double serving fixed stock and recording posts.
#[derive(Debug, Default)]
pub struct MemoryApi {
    pub stock: Vec<StockLevel>,
    pub entries: Mutex<Vec<EntryPayload>>,
    pub distributions: Mutex<Vec<DistributionPayload>>,
    pub sales: Mutex<Vec<SalePayload>>,
    /// Respond with this status to every post when set.
    pub reject_with: Option<u16>,
}

impl MemoryApi {
    pub fn with_stock(stock: Vec<StockLevel>) -> Self {
        Self {
            stock,
            ..Self::default()
        }
    }

    fn check(&self) -> SeedResult<()> {
        match self.reject_with {
            Some(status) => Err(SeedError::RemoteCall {
                status,
                body: "rejected".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InventoryApi for MemoryApi {
    async fn fetch_stock(&self) -> SeedResult<Vec<StockLevel>> {
        Ok(self.stock.clone())
    }

    async fn post_entry(&self, payload: &EntryPayload) -> SeedResult<()> {
        self.check()?;
        self.entries.lock().expect("entries lock").push(payload.clone());
        Ok(())
    }

    async fn post_distribution(&self, payload: &DistributionPayload) -> SeedResult<()> {
        self.check()?;
        self.distributions
            .lock()
            .expect("distributions lock")
            .push(payload.clone());
        Ok(())
    }

    async fn post_sale(&self, payload: &SalePayload) -> SeedResult<()> {
        self.check()?;
        self.sales.lock().expect("sales lock").push(payload.clone());
        Ok(())
    }
}

pub fn level(store_id: i64, product_id: i64, quantity: i64) -> StockLevel {
    StockLevel {
        product_id,
        store_id: Some(store_id),
        quantity,
    }
}

/// Central store 1 plus branches 2 and 3, products 1..=products.
pub fn branch_stock(products: i64) -> Vec<StockLevel> {
    let mut stock = Vec::new();
    for product_id in 1..=products {
        stock.push(level(1, product_id, 40));
        stock.push(level(2, product_id, 6));
        stock.push(level(3, product_id, 4));
    }
    stock
}
