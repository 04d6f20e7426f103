use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use stockseed_core::{CatalogDefinition, StageName, order_selection};
use stockseed_generate::{default_catalog, load_catalog};

use crate::errors::{SeedError, SeedResult};
use crate::remote::InventoryApi;
use crate::settings::{PersistenceMode, RunConfiguration};
use crate::stage::{RunReport, SeedStage, Stage, StageContext, StageOutcome, StageVariant};
use crate::stages::{
    ClientsStage, DistributionsApiStage, DistributionsStage, EntriesApiStage, EntriesStage,
    ProductsStage, SalesApiStage, SalesStage,
};
use crate::store::Database;

/// Runs seed stages in dependency order behind the production safety gate.
pub struct SeedRunner {
    config: RunConfiguration,
    database: Arc<dyn Database>,
    api: Option<Arc<dyn InventoryApi>>,
    catalog: Arc<CatalogDefinition>,
    rng_seed: u64,
    reference_time: DateTime<Utc>,
}

impl SeedRunner {
    /// `api` is required when `config.mode` is [`PersistenceMode::Api`].
    pub fn new(
        config: RunConfiguration,
        database: Arc<dyn Database>,
        api: Option<Arc<dyn InventoryApi>>,
    ) -> SeedResult<Self> {
        if config.mode == PersistenceMode::Api && api.is_none() {
            return Err(SeedError::Configuration(
                "api mode requires an inventory API client".to_string(),
            ));
        }

        let catalog = match &config.catalog {
            Some(path) => load_catalog(path)?,
            None => default_catalog()?,
        };
        let rng_seed = config.rng_seed.unwrap_or_else(rand::random::<u64>);

        Ok(Self {
            config,
            database,
            api,
            catalog: Arc::new(catalog),
            rng_seed,
            reference_time: Utc::now(),
        })
    }

    pub fn with_catalog(mut self, catalog: CatalogDefinition) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Anchor for generated dates; defaults to the construction time.
    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = reference_time;
        self
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Products and clients are always direct; the rest follow the mode.
    pub fn variant_for(&self, name: StageName) -> StageVariant {
        match (name, self.config.mode) {
            (StageName::Products | StageName::Clients, _) => StageVariant::Direct,
            (_, PersistenceMode::Direct) => StageVariant::Direct,
            (_, PersistenceMode::Api) => StageVariant::Api,
        }
    }

    fn context(&self) -> StageContext {
        StageContext {
            profile: self.config.profile,
            rng_seed: self.rng_seed,
            reference_time: self.reference_time,
        }
    }

    fn api(&self) -> SeedResult<Arc<dyn InventoryApi>> {
        self.api.clone().ok_or_else(|| {
            SeedError::Configuration("api mode requires an inventory API client".to_string())
        })
    }

    /// Build the stage registered for `name` under the current mode.
    pub fn build_stage(&self, name: StageName) -> SeedResult<Box<dyn Stage>> {
        let context = self.context();
        let stage: Box<dyn Stage> = match (name, self.variant_for(name)) {
            (StageName::Products, _) => Box::new(ProductsStage::new(self.catalog.clone(), context)),
            (StageName::Clients, _) => Box::new(ClientsStage::new(context)),
            (StageName::Entries, StageVariant::Direct) => Box::new(EntriesStage::new(context)),
            (StageName::Entries, StageVariant::Api) => {
                Box::new(EntriesApiStage::new(self.api()?, context))
            }
            (StageName::Distributions, StageVariant::Direct) => {
                Box::new(DistributionsStage::new(context))
            }
            (StageName::Distributions, StageVariant::Api) => {
                Box::new(DistributionsApiStage::new(self.api()?, context))
            }
            (StageName::Sales, StageVariant::Direct) => Box::new(SalesStage::new(context)),
            (StageName::Sales, StageVariant::Api) => {
                Box::new(SalesApiStage::new(self.api()?, context))
            }
        };
        Ok(stage)
    }

    /// Resolve requested names into canonical order.
    ///
    /// `None` or an empty list selects every stage. Unknown names are logged
    /// and skipped. Missing dependencies are not added.
    pub fn plan(&self, only: Option<&[String]>) -> Vec<StageName> {
        let requested = match only {
            Some(names) if !names.is_empty() => names,
            _ => return StageName::ALL.to_vec(),
        };

        let mut selected = Vec::new();
        for name in requested {
            match name.parse::<StageName>() {
                Ok(stage) => selected.push(stage),
                Err(_) => warn!(stage = %name, "unknown seed stage, skipping"),
            }
        }
        order_selection(&selected)
    }

    /// Run the selected stages, stopping at the first failure.
    pub async fn run(&self, only: Option<&[String]>) -> SeedResult<RunReport> {
        info!(
            environment = %self.config.environment,
            size = %self.config.size,
            mode = %self.config.mode,
            rng_seed = self.rng_seed,
            products = self.config.profile.products_count,
            clients = self.config.profile.clients_count,
            entries = self.config.profile.entries_count,
            distributions = self.config.profile.distributions_count,
            sales = self.config.profile.sales_count,
            batch_size = self.config.profile.batch_size,
            "seed runner started"
        );

        let mut report = RunReport {
            environment: self.config.environment.clone(),
            size: self.config.size,
            profile: self.config.profile,
            rng_seed: self.rng_seed,
            dry_run: self.config.dry_run,
            aborted: false,
            stages: Vec::new(),
        };

        if self.config.is_blocked() {
            warn!(
                environment = %self.config.environment,
                "production-like environment without FORCE_SEED=true, aborting"
            );
            report.aborted = true;
            return Ok(report);
        }

        let plan = self.plan(only);

        if self.config.dry_run {
            for name in &plan {
                let variant = self.variant_for(*name);
                info!(stage = %name, variant = %variant, "dry run, stage planned");
                report.stages.push(StageOutcome::planned(*name, variant));
            }
            return Ok(report);
        }

        for name in plan {
            let mut stage = SeedStage::new(self.build_stage(name)?);
            let outcome = stage.run(self.database.as_ref()).await?;
            report.stages.push(outcome);
        }

        info!(
            stages = report.stages.len(),
            records = report.total_records(),
            "seed run finished"
        );
        Ok(report)
    }

    /// Every stage in canonical order.
    pub async fn run_all(&self) -> SeedResult<RunReport> {
        self.run(None).await
    }

    /// The named stages, reordered canonically.
    pub async fn run_selected(&self, names: &[String]) -> SeedResult<RunReport> {
        self.run(Some(names)).await
    }
}
