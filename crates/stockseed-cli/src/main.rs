mod registry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stockseed_core::{
    Error as CoreError, ProfileOverrides, SeedProfile, SeedSize, StageName,
    build_stage_graph_report, describe_missing, redact_connection_string,
    resolve_with_dependencies,
};
use stockseed_seed::{
    CLEANUP_TABLES, Database, DatabaseLayer, HttpInventoryApi, InventoryApi, PersistenceMode,
    PgDatabase, RunConfiguration, SeedError, SeedRunner, SettingsLayer, StageStatus,
    select_tables, truncate_tables,
};
use thiserror::Error;
use uuid::Uuid;

use registry::{RunContext, init_console_logging, init_run_logging, start_run, write_report};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("seed error: {0}")]
    Seed(#[from] SeedError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("aborted: {0}")]
    Aborted(String),
}

#[derive(Parser, Debug)]
#[command(name = "stockseed", version, about = "Seed an inventory database with synthetic data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run seed stages against the configured database or API.
    Seed(SeedArgs),
    /// Truncate seeded tables.
    Clean(CleanArgs),
    /// List the volume presets.
    Profiles(ProfilesArgs),
    /// Validate a stage selection against the dependency table.
    CheckDeps(CheckDepsArgs),
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// TOML settings file layered over the environment.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Deployment environment (overrides APP_ENV).
    #[arg(long = "env", value_name = "NAME")]
    environment: Option<String>,
    /// Volume preset.
    #[arg(long)]
    size: Option<SeedSize>,
    /// Persistence mode for entries, distributions and sales.
    #[arg(long)]
    mode: Option<PersistenceMode>,
    /// Stage to run; repeat to select several. Defaults to all stages.
    #[arg(long = "stage", value_name = "STAGE")]
    stages: Vec<StageName>,
    /// Add missing dependencies to the selection.
    #[arg(long, default_value_t = false, conflicts_with = "skip_dep_check")]
    with_deps: bool,
    /// Run the selection even when dependencies are missing.
    #[arg(long, default_value_t = false)]
    skip_dep_check: bool,
    /// Allow seeding a production-like environment.
    #[arg(long, default_value_t = false)]
    force: bool,
    /// Resolve and record the plan without executing any stage.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Fixed run seed for reproducible data.
    #[arg(long = "seed", value_name = "N")]
    rng_seed: Option<u64>,
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
    /// Catalog JSON replacing the bundled one.
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
    #[arg(long)]
    products: Option<usize>,
    #[arg(long)]
    clients: Option<usize>,
    #[arg(long)]
    entries: Option<usize>,
    #[arg(long)]
    distributions: Option<usize>,
    #[arg(long)]
    sales: Option<usize>,
    #[arg(long)]
    batch_size: Option<usize>,
    /// Database connection string (overrides DATABASE_URL and DB_*).
    #[arg(long, value_name = "CONNECTION_STRING")]
    database_url: Option<String>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
}

impl SeedArgs {
    fn flag_layer(&self) -> SettingsLayer {
        let mut layer = SettingsLayer {
            app_env: self.environment.clone(),
            seed_size: self.size,
            force_seed: self.force.then_some(true),
            dry_run: self.dry_run.then_some(true),
            mode: self.mode,
            rng_seed: self.rng_seed,
            api_url: self.api_url.clone(),
            catalog: self.catalog.clone(),
            profile: ProfileOverrides {
                products_count: self.products,
                clients_count: self.clients,
                entries_count: self.entries,
                distributions_count: self.distributions,
                sales_count: self.sales,
                batch_size: self.batch_size,
            },
            ..SettingsLayer::default()
        };
        layer.database.url = self.database_url.clone();
        layer
    }
}

#[derive(Args, Debug)]
struct CleanArgs {
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Table to truncate; repeat to select several. Defaults to every allowed table.
    #[arg(long = "table", value_name = "TABLE")]
    tables: Vec<String>,
    #[arg(long, value_name = "CONNECTION_STRING")]
    database_url: Option<String>,
    /// Allow cleaning a production-like environment.
    #[arg(long, default_value_t = false)]
    force: bool,
    /// Actually truncate; without it the selected tables are only listed.
    #[arg(long, default_value_t = false)]
    yes: bool,
}

#[derive(Args, Debug)]
struct ProfilesArgs {
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct CheckDepsArgs {
    #[arg(long = "stage", value_name = "STAGE")]
    stages: Vec<StageName>,
    /// Print the selection with dependencies added instead of failing.
    #[arg(long, default_value_t = false)]
    with_deps: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Seed(args) => run_seed(args).await,
        Command::Clean(args) => run_clean(args).await,
        Command::Profiles(args) => run_profiles(args),
        Command::CheckDeps(args) => run_check_deps(args),
    }
}

fn load_configuration(
    path: Option<&PathBuf>,
    flags: SettingsLayer,
) -> Result<RunConfiguration, CliError> {
    let mut layers = vec![SettingsLayer::from_env()?];
    if let Some(path) = path {
        layers.push(SettingsLayer::load_file(path)?);
    }
    layers.push(flags);
    Ok(RunConfiguration::from_layers(layers)?)
}

/// Apply the dependency policy to an explicit selection.
fn checked_selection(
    stages: &[StageName],
    with_deps: bool,
    skip_dep_check: bool,
) -> Result<Vec<StageName>, CliError> {
    if stages.is_empty() {
        return Ok(StageName::ALL.to_vec());
    }
    if with_deps {
        return Ok(resolve_with_dependencies(stages));
    }
    match describe_missing(stages) {
        Some(message) if !skip_dep_check => Err(CliError::InvalidConfig(format!(
            "{message}; pass --with-deps or --skip-dep-check"
        ))),
        _ => Ok(stages.to_vec()),
    }
}

async fn run_seed(args: SeedArgs) -> Result<(), CliError> {
    let selection = checked_selection(&args.stages, args.with_deps, args.skip_dep_check)?;
    let mut configuration = load_configuration(args.config.as_ref(), args.flag_layer())?;
    let rng_seed = *configuration.rng_seed.get_or_insert_with(rand::random::<u64>);

    let conn = configuration.database.connection_url()?;
    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: args.run_dir,
        configuration: configuration.clone(),
        rng_seed,
        stages: selection.clone(),
        connection: redact_connection_string(&conn),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, rng_seed);

    let timer = Instant::now();

    let database = if configuration.dry_run || configuration.is_blocked() {
        PgDatabase::connect_lazy(&conn)?
    } else {
        PgDatabase::connect(&conn).await?
    };
    let database: Arc<dyn Database> = Arc::new(database);

    let api: Option<Arc<dyn InventoryApi>> = match configuration.mode {
        PersistenceMode::Api => Some(Arc::new(HttpInventoryApi::new(&configuration.api_url)?)),
        PersistenceMode::Direct => None,
    };

    let runner = SeedRunner::new(configuration, database, api)?;
    let names: Vec<String> = selection
        .iter()
        .map(|stage| stage.as_str().to_string())
        .collect();
    let report = runner.run_selected(&names).await?;

    write_report(&run_paths, &report)?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());

    let duration_ms = timer.elapsed().as_millis();

    if report.aborted {
        tracing::info!(event = "run_finished", status = "aborted", duration_ms = duration_ms);
        return Err(CliError::Aborted(format!(
            "environment {} is production-like; pass --force or set FORCE_SEED=true",
            report.environment
        )));
    }

    for outcome in &report.stages {
        let status = match outcome.status {
            StageStatus::Completed => "completed",
            StageStatus::Planned => "planned",
        };
        println!(
            "{:<14} {:<7} {:<10} {:>8} records {:>7} ms{}",
            outcome.stage.as_str(),
            outcome.variant.as_str(),
            status,
            outcome.records,
            outcome.duration_ms,
            if outcome.exhausted { " (stock exhausted)" } else { "" }
        );
    }
    println!("run {run_id}: {} records, seed {rng_seed}", report.total_records());

    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

async fn run_clean(args: CleanArgs) -> Result<(), CliError> {
    init_console_logging()?;

    let flags = SettingsLayer {
        force_seed: args.force.then_some(true),
        database: DatabaseLayer {
            url: args.database_url.clone(),
            ..Default::default()
        },
        ..SettingsLayer::default()
    };
    let configuration = load_configuration(args.config.as_ref(), flags)?;

    if configuration.is_blocked() {
        return Err(CliError::Aborted(format!(
            "refusing to clean production-like environment {} without --force",
            configuration.environment
        )));
    }

    let tables = select_tables(&args.tables)?;

    if !args.yes {
        println!("would truncate (pass --yes to proceed):");
        for table in &tables {
            println!("  {table}");
        }
        return Ok(());
    }

    let database = PgDatabase::connect(&configuration.database.connection_url()?).await?;
    truncate_tables(&database, &tables).await?;

    tracing::info!(event = "clean_finished", tables = tables.len());
    println!("truncated {} of {} tables", tables.len(), CLEANUP_TABLES.len());

    Ok(())
}

#[derive(Serialize)]
struct PresetRow {
    size: SeedSize,
    #[serde(flatten)]
    profile: SeedProfile,
}

fn run_profiles(args: ProfilesArgs) -> Result<(), CliError> {
    let rows: Vec<PresetRow> = SeedSize::ALL
        .into_iter()
        .map(|size| PresetRow {
            size,
            profile: SeedProfile::preset(size),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<8} {:>9} {:>8} {:>8} {:>14} {:>7} {:>6}",
        "size", "products", "clients", "entries", "distributions", "sales", "batch"
    );
    for row in rows {
        let profile = row.profile;
        println!(
            "{:<8} {:>9} {:>8} {:>8} {:>14} {:>7} {:>6}",
            row.size.as_str(),
            profile.products_count,
            profile.clients_count,
            profile.entries_count,
            profile.distributions_count,
            profile.sales_count,
            profile.batch_size
        );
    }
    Ok(())
}

fn run_check_deps(args: CheckDepsArgs) -> Result<(), CliError> {
    let graph = build_stage_graph_report();
    match &graph.topo_order {
        Some(order) => {
            let names: Vec<&str> = order.iter().map(|stage| stage.as_str()).collect();
            println!("stage order: {}", names.join(" -> "));
        }
        None => {
            return Err(CliError::InvalidConfig(
                "stage dependency table contains a cycle".to_string(),
            ));
        }
    }

    if args.stages.is_empty() {
        return Ok(());
    }

    if args.with_deps {
        let resolved = resolve_with_dependencies(&args.stages);
        let names: Vec<&str> = resolved.iter().map(|stage| stage.as_str()).collect();
        println!("selection with dependencies: {}", names.join(", "));
        return Ok(());
    }

    match describe_missing(&args.stages) {
        Some(message) => Err(CliError::InvalidConfig(message)),
        None => {
            println!("selection is complete");
            Ok(())
        }
    }
}
