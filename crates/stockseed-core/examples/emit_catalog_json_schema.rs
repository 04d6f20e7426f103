use schemars::schema_for;
use stockseed_core::{CatalogDefinition, SeedProfile};

fn main() {
    let which = std::env::args().nth(1).unwrap_or_else(|| "catalog".to_string());
    let schema = match which.as_str() {
        "profile" => schema_for!(SeedProfile),
        _ => schema_for!(CatalogDefinition),
    };
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
