//! Staged seeding of the inventory database.
//!
//! A [`SeedRunner`] resolves the requested stages into dependency order and
//! runs each one as a [`SeedStage`]: one unit of work per stage, committed on
//! success and rolled back on failure. Stages reach the database through the
//! [`Database`] and [`SeedTransaction`] traits and the inventory service
//! through [`InventoryApi`].

pub mod cleanup;
pub mod errors;
pub mod postgres;
pub mod remote;
pub mod runner;
pub mod settings;
pub mod stage;
pub mod stages;
pub mod store;

pub use cleanup::{CLEANUP_TABLES, select_tables, truncate_tables};
pub use errors::{SeedError, SeedResult};
pub use postgres::PgDatabase;
pub use remote::{DEFAULT_API_URL, HttpInventoryApi, InventoryApi};
pub use runner::SeedRunner;
pub use settings::{
    DatabaseLayer, DatabaseSettings, PRODUCTION_LIKE_ENVIRONMENTS, PersistenceMode,
    RunConfiguration, SettingsLayer,
};
pub use stage::{
    RunReport, SeedStage, Stage, StageContext, StageOutcome, StageOutput, StageState,
    StageStatus, StageVariant,
};
pub use store::{BatchInsert, Database, SeedTransaction, SqlValue};
