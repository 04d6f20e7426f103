use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use stockseed_core::{SeedProfile, SeedSize, StageName};
use stockseed_generate::{ProductOptions, TransactionOptions, keyed_rng};

use crate::errors::SeedResult;
use crate::store::{Database, SeedTransaction};

/// How a stage persists its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageVariant {
    /// Batched SQL inserts inside the stage transaction.
    Direct,
    /// JSON posts to the inventory API.
    Api,
}

impl StageVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageVariant::Direct => "direct",
            StageVariant::Api => "api",
        }
    }
}

impl fmt::Display for StageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a [`SeedStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    Idle,
    Running,
    Committed,
    RolledBack,
}

/// What a stage reports after `execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageOutput {
    /// Rows inserted or payloads accepted.
    pub records: usize,
    /// Set when stock ran out before the profile count was reached.
    pub exhausted: bool,
}

impl StageOutput {
    pub fn records(records: usize) -> Self {
        Self {
            records,
            exhausted: false,
        }
    }
}

/// Everything a stage needs besides its transaction.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub profile: SeedProfile,
    pub rng_seed: u64,
    /// Generated dates are relative to this instant.
    pub reference_time: DateTime<Utc>,
}

impl StageContext {
    /// Rng for one stage; stable for a given run seed.
    pub fn rng(&self, stage: StageName) -> ChaCha8Rng {
        keyed_rng(self.rng_seed, stage.as_str())
    }

    pub fn product_options(&self) -> ProductOptions {
        ProductOptions {
            reference_date: self.reference_time.date_naive(),
            ..ProductOptions::default()
        }
    }

    pub fn transaction_options(&self) -> TransactionOptions {
        TransactionOptions {
            reference_time: self.reference_time,
            ..TransactionOptions::default()
        }
    }
}

/// One step of the seed pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> StageName;

    fn variant(&self) -> StageVariant;

    /// Generate and persist this stage's records through `tx`.
    async fn execute(&self, tx: &mut dyn SeedTransaction) -> SeedResult<StageOutput>;
}

/// Runs a [`Stage`] inside its own unit of work.
pub struct SeedStage {
    stage: Box<dyn Stage>,
    state: StageState,
}

impl SeedStage {
    pub fn new(stage: Box<dyn Stage>) -> Self {
        Self {
            stage,
            state: StageState::Idle,
        }
    }

    pub fn name(&self) -> StageName {
        self.stage.name()
    }

    pub fn variant(&self) -> StageVariant {
        self.stage.variant()
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    /// Commit on success; roll back and return the error on failure.
    pub async fn run(&mut self, db: &dyn Database) -> SeedResult<StageOutcome> {
        let stage = self.stage.name();
        let variant = self.stage.variant();
        let timer = Instant::now();
        info!(stage = %stage, variant = %variant, "stage started");

        self.state = StageState::Running;
        let mut tx = match db.begin().await {
            Ok(tx) => tx,
            Err(err) => {
                self.state = StageState::RolledBack;
                error!(stage = %stage, error = %err, "stage could not open a transaction");
                return Err(err);
            }
        };

        let result = match self.stage.execute(tx.as_mut()).await {
            Ok(output) => tx.commit().await.map(|()| output),
            Err(err) => Err(err),
        };

        let duration_ms = timer.elapsed().as_millis() as u64;
        match result {
            Ok(output) => {
                self.state = StageState::Committed;
                info!(
                    stage = %stage,
                    variant = %variant,
                    duration_ms,
                    records = output.records,
                    exhausted = output.exhausted,
                    "stage committed"
                );
                Ok(StageOutcome::completed(stage, variant, duration_ms, output))
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(stage = %stage, error = %rollback_err, "rollback failed");
                }
                self.state = StageState::RolledBack;
                error!(
                    stage = %stage,
                    variant = %variant,
                    duration_ms,
                    error = %err,
                    "stage rolled back"
                );
                Err(err)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Planned,
}

/// Per-stage entry of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: StageName,
    pub variant: StageVariant,
    pub status: StageStatus,
    pub duration_ms: u64,
    pub records: usize,
    pub exhausted: bool,
}

impl StageOutcome {
    pub fn completed(
        stage: StageName,
        variant: StageVariant,
        duration_ms: u64,
        output: StageOutput,
    ) -> Self {
        Self {
            stage,
            variant,
            status: StageStatus::Completed,
            duration_ms,
            records: output.records,
            exhausted: output.exhausted,
        }
    }

    pub fn planned(stage: StageName, variant: StageVariant) -> Self {
        Self {
            stage,
            variant,
            status: StageStatus::Planned,
            duration_ms: 0,
            records: 0,
            exhausted: false,
        }
    }
}

/// Summary of one runner invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub environment: String,
    pub size: SeedSize,
    pub profile: SeedProfile,
    pub rng_seed: u64,
    pub dry_run: bool,
    /// The safety gate refused to run.
    pub aborted: bool,
    pub stages: Vec<StageOutcome>,
}

impl RunReport {
    pub fn total_records(&self) -> usize {
        self.stages.iter().map(|outcome| outcome.records).sum()
    }

    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.iter().map(|outcome| outcome.stage).collect()
    }
}
