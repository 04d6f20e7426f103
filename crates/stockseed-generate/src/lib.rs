//! Record generators for stockseed.
//!
//! Products and clients are synthesized from a catalog and fixed name pools.
//! Entries, distributions and sales are built against existing ids, with the
//! consuming generators drawing from a [`StockLedger`] so no pool goes
//! negative within a run.

pub mod catalog;
pub mod clients;
pub mod errors;
pub mod ledger;
pub mod pricing;
pub mod products;
pub mod rng;
pub mod transactions;
pub mod variations;

pub use catalog::{default_catalog, load_catalog, parse_catalog, validate_catalog};
pub use clients::{ClientGenerator, generate_cpf, verify_cpf};
pub use errors::GenerationError;
pub use ledger::{MIN_DONOR_QUANTITY, StockLedger};
pub use pricing::{PricePair, PriceRange, price_range, synthesize};
pub use products::{ProductGenerator, ProductOptions};
pub use rng::keyed_rng;
pub use transactions::{
    AllocationBatch, DistributionGenerator, EntryGenerator, ExpirationPolicy, SaleGenerator,
    TransactionOptions,
};
pub use variations::{Combination, expand, format_product_name};
