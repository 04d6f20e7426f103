mod common;

use async_trait::async_trait;
use chrono::Utc;

use common::MemoryDatabase;
use stockseed_core::{SeedProfile, SeedSize, StageName};
use stockseed_seed::stages::ClientsStage;
use stockseed_seed::{
    BatchInsert, SeedError, SeedResult, SeedStage, SeedTransaction, Stage, StageContext,
    StageOutput, StageState, StageStatus, StageVariant,
};

fn context() -> StageContext {
    StageContext {
        profile: SeedProfile::preset(SeedSize::Small),
        rng_seed: 42,
        reference_time: Utc::now(),
    }
}

/// Writes one row, then fails.
struct FailingStage;

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> StageName {
        StageName::Products
    }

    fn variant(&self) -> StageVariant {
        StageVariant::Direct
    }

    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput> {
        let mut insert = BatchInsert::new("products", &["name"]);
        insert.push_row(vec!["Partial".into()]);
        tx.insert_rows(&insert, 10).await?;
        Err(SeedError::Precondition("boom".to_string()))
    }
}

#[tokio::test]
async fn successful_stage_commits() {
    let db = MemoryDatabase::default();
    let mut stage = SeedStage::new(Box::new(ClientsStage::new(context())));
    assert_eq!(stage.state(), StageState::Idle);

    let outcome = stage.run(&db).await.expect("stage run");

    assert_eq!(stage.state(), StageState::Committed);
    assert_eq!(outcome.stage, StageName::Clients);
    assert_eq!(outcome.status, StageStatus::Completed);
    assert_eq!(outcome.records, 20);
    assert_eq!(db.row_count("clients"), 20);
    assert_eq!((db.commits(), db.rollbacks()), (1, 0));
}

#[tokio::test]
async fn failing_stage_rolls_back_and_reraises() {
    let db = MemoryDatabase::default();
    let mut stage = SeedStage::new(Box::new(FailingStage));

    let err = stage.run(&db).await.expect_err("stage should fail");

    assert!(matches!(err, SeedError::Precondition(message) if message == "boom"));
    assert_eq!(stage.state(), StageState::RolledBack);
    assert_eq!(db.row_count("products"), 0);
    assert_eq!((db.commits(), db.rollbacks()), (0, 1));
}

#[tokio::test]
async fn rerunning_clients_skips_duplicate_documents() {
    let db = MemoryDatabase::default();

    let first = SeedStage::new(Box::new(ClientsStage::new(context())))
        .run(&db)
        .await
        .expect("first run");
    let second = SeedStage::new(Box::new(ClientsStage::new(context())))
        .run(&db)
        .await
        .expect("second run");

    assert_eq!(first.records, 20);
    assert_eq!(second.records, 0);
    assert_eq!(db.row_count("clients"), 20);
}
