use stockseed_generate::{ProductGenerator, ProductOptions, default_catalog, keyed_rng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let count: usize = std::env::args()
        .nth(1)
        .map(|value| value.parse())
        .transpose()?
        .unwrap_or(20);

    // RUST_LOG=debug shows per-category expansion.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let catalog = default_catalog()?;
    let generator = ProductGenerator::new(&catalog, ProductOptions::default())?;
    let mut rng = keyed_rng(42, "products");

    for product in generator.generate(count, &mut rng)? {
        println!(
            "{}\t{}\t{:.2}\t{:.2}",
            product.category_id, product.name, product.cost_price, product.sale_price
        );
    }
    Ok(())
}
