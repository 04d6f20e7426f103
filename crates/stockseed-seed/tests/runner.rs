mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use common::{MemoryApi, MemoryDatabase, branch_stock};
use stockseed_core::{SeedSize, StageName};
use stockseed_seed::{
    InventoryApi, PersistenceMode, RunConfiguration, SeedError, SeedRunner, SettingsLayer,
    SqlValue, StageStatus, StageVariant,
};

fn config(mode: PersistenceMode, env: &str, force: bool, dry_run: bool) -> RunConfiguration {
    RunConfiguration::from_layer(SettingsLayer {
        app_env: Some(env.to_string()),
        seed_size: Some(SeedSize::Small),
        force_seed: Some(force),
        dry_run: Some(dry_run),
        mode: Some(mode),
        rng_seed: Some(42),
        ..SettingsLayer::default()
    })
    .expect("config")
}

fn api_runner(config: RunConfiguration, db: &MemoryDatabase, api: &Arc<MemoryApi>) -> SeedRunner {
    let api: Arc<dyn InventoryApi> = api.clone();
    SeedRunner::new(config, db.handle(), Some(api))
        .expect("runner")
        .with_reference_time(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
}

fn direct_runner(db: &MemoryDatabase, rng_seed: u64) -> SeedRunner {
    let mut config = config(PersistenceMode::Direct, "dev", false, false);
    config.rng_seed = Some(rng_seed);
    SeedRunner::new(config, db.handle(), None)
        .expect("runner")
        .with_reference_time(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
}

fn int(value: &SqlValue) -> i64 {
    match value {
        SqlValue::Int(value) => *value,
        other => panic!("expected an integer, got {other:?}"),
    }
}

/// Net units per `(store, product)` implied by the transaction tables.
fn stock_from_movements(db: &MemoryDatabase) -> BTreeMap<(i64, i64), i64> {
    let mut stock: BTreeMap<(i64, i64), i64> = BTreeMap::new();
    for row in db.rows("product_entry_items") {
        *stock.entry((1, int(&row[1]))).or_insert(0) += int(&row[2]);
    }

    let distributions = db.rows("internal_distributions");
    for row in db.rows("internal_distribution_items") {
        let header = &distributions[int(&row[0]) as usize - 1];
        let (product_id, quantity) = (int(&row[1]), int(&row[2]));
        *stock.entry((int(&header[0]), product_id)).or_insert(0) -= quantity;
        *stock.entry((int(&header[1]), product_id)).or_insert(0) += quantity;
    }

    let sales = db.rows("sales");
    for row in db.rows("sale_items") {
        let header = &sales[int(&row[0]) as usize - 1];
        *stock.entry((int(&header[1]), int(&row[1]))).or_insert(0) -= int(&row[2]);
    }

    stock.retain(|_, quantity| *quantity != 0);
    stock
}

fn stock_table(db: &MemoryDatabase) -> BTreeMap<(i64, i64), i64> {
    db.stock()
        .into_iter()
        .filter(|level| level.quantity != 0)
        .map(|level| ((level.store_id.unwrap_or(0), level.product_id), level.quantity))
        .collect()
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[tokio::test]
async fn safety_gate_blocks_production_without_force() {
    let db = MemoryDatabase::with_references(3, 2);
    let api = Arc::new(MemoryApi::with_stock(branch_stock(10)));
    let runner = api_runner(config(PersistenceMode::Api, "prod", false, false), &db, &api);

    let report = runner.run_all().await.expect("run");

    assert!(report.aborted);
    assert!(report.stages.is_empty());
    assert_eq!(db.begins(), 0);
    assert!(api.entries.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn force_flag_opens_the_gate() {
    let db = MemoryDatabase::with_references(3, 2);
    let api = Arc::new(MemoryApi::with_stock(branch_stock(10)));
    let runner = api_runner(config(PersistenceMode::Api, "render", true, false), &db, &api);

    let report = runner.run_selected(&names(&["clients"])).await.expect("run");

    assert!(!report.aborted);
    assert_eq!(report.stage_names(), vec![StageName::Clients]);
    assert_eq!(db.row_count("clients"), 20);
}

#[tokio::test]
async fn dry_run_plans_without_executing() {
    let db = MemoryDatabase::with_references(3, 2);
    let api = Arc::new(MemoryApi::with_stock(branch_stock(10)));
    let runner = api_runner(config(PersistenceMode::Api, "dev", false, true), &db, &api);

    let report = runner.run_all().await.expect("run");

    assert_eq!(report.stage_names(), StageName::ALL.to_vec());
    assert!(report.stages.iter().all(|stage| stage.status == StageStatus::Planned));
    assert_eq!(report.stages[2].variant, StageVariant::Api);
    assert_eq!(db.begins(), 0);
}

#[tokio::test]
async fn selection_keeps_canonical_order_and_skips_unknown_names() {
    let db = MemoryDatabase::with_references(3, 2);
    let api = Arc::new(MemoryApi::with_stock(branch_stock(10)));
    let runner = api_runner(config(PersistenceMode::Api, "dev", false, false), &db, &api);

    let report = runner
        .run_selected(&names(&["clients", "inventory", "products"]))
        .await
        .expect("run");

    assert_eq!(report.stage_names(), vec![StageName::Products, StageName::Clients]);
    assert_eq!(db.commits(), 2);
}

#[tokio::test]
async fn api_mode_seeds_every_stage() {
    let db = MemoryDatabase::with_references(3, 2);
    let api = Arc::new(MemoryApi::with_stock(branch_stock(10)));
    let runner = api_runner(config(PersistenceMode::Api, "dev", false, false), &db, &api);

    let report = runner.run_all().await.expect("run");

    assert_eq!(report.stage_names(), StageName::ALL.to_vec());
    assert_eq!(db.commits(), 5);
    assert!(db.row_count("products") > 0);
    assert!(db.row_count("products") <= 50);
    assert_eq!(db.row_count("clients"), 20);
    assert_eq!(api.entries.lock().expect("lock").len(), 20);

    let distributions = api.distributions.lock().expect("lock");
    assert!(!distributions.is_empty());
    assert!(distributions.iter().all(|d| d.from_store_id == 1 && d.to_store_id != 1));

    let sales = api.sales.lock().expect("lock");
    assert!(!sales.is_empty());
    assert!(sales.iter().all(|sale| sale.store_id != 1));
    for store_id in [2, 3] {
        for product_id in 1..=10 {
            let sold: i64 = sales
                .iter()
                .filter(|sale| sale.store_id == store_id)
                .flat_map(|sale| &sale.items)
                .filter(|item| item.product_id == product_id)
                .map(|item| item.quantity)
                .sum();
            let available = if store_id == 2 { 6 } else { 4 };
            assert!(sold <= available, "store {store_id} product {product_id} oversold");
        }
    }
}

#[tokio::test]
async fn same_seed_produces_same_payloads() {
    let run = || async {
        let db = MemoryDatabase::with_references(3, 2);
        let api = Arc::new(MemoryApi::with_stock(branch_stock(10)));
        let runner = api_runner(config(PersistenceMode::Api, "dev", false, false), &db, &api);
        runner.run_all().await.expect("run");
        let entries = api.entries.lock().expect("lock").clone();
        let sales = api.sales.lock().expect("lock").clone();
        (entries, sales)
    };

    assert_eq!(run().await, run().await);
}

#[tokio::test]
async fn remote_failure_stops_the_run() {
    let db = MemoryDatabase::with_references(3, 2);
    let api = Arc::new(MemoryApi {
        stock: branch_stock(10),
        reject_with: Some(500),
        ..MemoryApi::default()
    });
    let runner = api_runner(config(PersistenceMode::Api, "dev", false, false), &db, &api);

    let err = runner.run_all().await.expect_err("run should fail");

    assert!(matches!(err, SeedError::RemoteCall { status: 500, .. }));
    assert_eq!(db.begins(), 3);
    assert_eq!((db.commits(), db.rollbacks()), (2, 1));
}

#[tokio::test]
async fn direct_mode_seeds_every_stage_from_empty_stock() {
    let db = MemoryDatabase::with_references(3, 2);
    let runner = direct_runner(&db, 42);

    let report = runner.run_all().await.expect("run");

    assert!(report.stages.iter().all(|stage| stage.variant == StageVariant::Direct));
    assert_eq!(db.row_count("product_entries"), 20);
    assert!(db.row_count("product_entry_items") >= 20);

    let distributions = db.rows("internal_distributions");
    assert!(!distributions.is_empty());
    assert!(distributions.iter().all(|row| row[0] == SqlValue::Int(1)));

    let sales = db.rows("sales");
    assert!(!sales.is_empty());
    assert!(sales.iter().all(|row| row[1] != SqlValue::Int(1)));

    assert_eq!(stock_table(&db), stock_from_movements(&db));
    assert!(db.stock().iter().all(|level| level.quantity >= 0));
}

#[tokio::test]
async fn repeated_direct_runs_only_sell_what_was_received() {
    let db = MemoryDatabase::with_references(3, 2);

    direct_runner(&db, 1).run_all().await.expect("first run");
    direct_runner(&db, 2).run_all().await.expect("second run");

    assert_eq!(db.row_count("product_entries"), 40);
    assert_eq!(stock_table(&db), stock_from_movements(&db));
    assert!(db.stock().iter().all(|level| level.quantity >= 0));
}

#[tokio::test]
async fn direct_entries_need_a_store_to_receive_stock() {
    let db = MemoryDatabase::with_references(0, 2);
    let runner = direct_runner(&db, 5);

    let err = runner
        .run_selected(&names(&["products", "entries"]))
        .await
        .expect_err("entries without stores");

    assert!(matches!(err, SeedError::Precondition(_)));
    assert_eq!((db.commits(), db.rollbacks()), (1, 1));
    assert!(db.stock().is_empty());
}

#[tokio::test]
async fn api_mode_requires_a_client() {
    let db = MemoryDatabase::with_references(3, 2);
    let result = SeedRunner::new(
        config(PersistenceMode::Api, "dev", false, false),
        db.handle(),
        None,
    );
    assert!(matches!(result, Err(SeedError::Configuration(_))));
}
