//! Core contracts for stockseed.
//!
//! This crate defines the seed profiles, the product catalog format, the
//! candidate records and API payloads, and the stage dependency table shared
//! by the generators, the seed pipeline and the CLI.

pub mod catalog;
pub mod error;
pub mod graph;
pub mod payloads;
pub mod profile;
pub mod records;
pub mod redaction;
pub mod stages;

pub use catalog::{CatalogDefinition, Category, OrderedMap, Subcategory, Variations};
pub use error::{Error, Result};
pub use graph::{StageGraphReport, StageGraphSummary, build_stage_graph_report, canonical_order};
pub use payloads::{
    DeliveryType, DistributionItem, DistributionPayload, EntryItem, EntryPayload, STATUS_COMPLETED,
    SaleItem, SalePayload,
};
pub use profile::{DEFAULT_BATCH_SIZE, ProfileOverrides, SeedProfile, SeedSize};
pub use records::{CandidateClient, CandidateProduct, ProductRef, StockKey, StockLevel};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use stages::{
    STAGE_DEPENDENCIES, StageName, describe_missing, missing_dependencies, order_selection,
    resolve_with_dependencies,
};
