use stockseed_core::Variations;
use stockseed_generate::{
    ClientGenerator, GenerationError, ProductGenerator, ProductOptions, default_catalog, expand,
    format_product_name, keyed_rng, parse_catalog, price_range, synthesize, verify_cpf,
};

fn axis(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn synthesized_prices_stay_in_range() {
    let mut rng = keyed_rng(11, "pricing");
    for category in ["Eletrônicos", "Bebidas", "Papelaria"] {
        let range = price_range(category).expect("priced category");
        for _ in 0..200 {
            let pair = synthesize(category, &mut rng).expect("synthesize");
            assert!(pair.sale_price >= range.min && pair.sale_price <= range.max);
            assert!(pair.cost_price < pair.sale_price);
            assert!(pair.cost_price >= pair.sale_price * 0.6 - 0.01);
        }
    }
}

#[test]
fn unknown_category_is_rejected() {
    let mut rng = keyed_rng(1, "pricing");
    let err = synthesize("Brinquedos", &mut rng).expect_err("unknown category");
    assert!(matches!(err, GenerationError::UnknownCategory(name) if name == "Brinquedos"));
}

#[test]
fn empty_variation_map_yields_one_combination() {
    let empty = Variations::new();
    let combos: Vec<_> = expand(&empty, 0).collect();
    assert_eq!(combos, vec![Vec::new()]);
    assert_eq!(format_product_name("Pochete", &combos[0]), "Pochete");
}

#[test]
fn expansion_is_bounded_by_cap() {
    let mut map = Variations::new();
    map.insert("cor", axis(&["Preto", "Azul"]));
    map.insert("tamanho", axis(&["P", "M", "G"]));

    assert_eq!(expand(&map, 100).count(), 6);
    assert_eq!(expand(&map, 4).count(), 4);
    assert_eq!(expand(&map, 4).size_hint(), (4, Some(4)));

    let first: Vec<_> = expand(&map, 2).collect();
    assert_eq!(first[0], vec![("cor", "Preto"), ("tamanho", "P")]);
    assert_eq!(first[1], vec![("cor", "Preto"), ("tamanho", "M")]);
    assert_eq!(format_product_name("Camiseta", &first[1]), "Camiseta Preto M");
}

#[test]
fn large_products_are_not_materialized() {
    let values: Vec<String> = (0..50).map(|i| i.to_string()).collect();
    let mut map = Variations::new();
    for name in ["a", "b", "c", "d"] {
        map.insert(name, values.clone());
    }
    assert_eq!(expand(&map, 40).count(), 40);
}

#[test]
fn products_respect_target_and_categories() {
    let catalog = default_catalog().expect("default catalog");
    let generator =
        ProductGenerator::new(&catalog, ProductOptions::default()).expect("product generator");
    let mut rng = keyed_rng(3, "products");

    assert!(generator.generate(0, &mut rng).expect("generate").is_empty());

    let products = generator.generate(50, &mut rng).expect("generate");
    assert!(!products.is_empty());
    assert!(products.len() <= 50);
    for product in &products {
        assert!(product.category_id >= 1);
        assert!(product.category_id <= catalog.category_count() as i64);
        assert!(product.cost_price < product.sale_price);
        assert!(!product.active);
        assert_eq!(product.description, format!("Produto {}", product.name));
    }
}

#[test]
fn product_generation_is_deterministic_per_seed() {
    let catalog = default_catalog().expect("default catalog");
    let generator =
        ProductGenerator::new(&catalog, ProductOptions::default()).expect("product generator");

    let a = generator
        .generate(30, &mut keyed_rng(9, "products"))
        .expect("generate a");
    let b = generator
        .generate(30, &mut keyed_rng(9, "products"))
        .expect("generate b");
    assert_eq!(a, b);
}

#[test]
fn catalog_with_unpriced_category_fails_validation() {
    let content = r#"{"Brinquedos": {"Bonecas": {"base_products": ["Boneca"], "variations": {}}}}"#;
    let err = parse_catalog(content).expect_err("unpriced category");
    assert!(matches!(err, GenerationError::UnknownCategory(_)));
}

#[test]
fn catalog_preserves_category_order() {
    let content = r#"{
        "Limpeza": {"Casa": {"base_products": ["Detergente"]}},
        "Alimentos": {"Mercearia": {"base_products": ["Arroz"]}}
    }"#;
    let catalog = parse_catalog(content).expect("parse catalog");
    assert_eq!(catalog.category_id("Limpeza"), Some(1));
    assert_eq!(catalog.category_id("Alimentos"), Some(2));
}

#[test]
fn clients_have_valid_documents_and_unique_emails() {
    let mut rng = keyed_rng(5, "clients");
    let clients = ClientGenerator::new().generate(40, &mut rng);
    assert_eq!(clients.len(), 40);

    let mut emails: Vec<&str> = clients.iter().map(|c| c.email.as_str()).collect();
    emails.sort_unstable();
    emails.dedup();
    assert_eq!(emails.len(), 40);

    for client in &clients {
        assert!(verify_cpf(&client.cpf_cnpj), "invalid cpf {}", client.cpf_cnpj);
        assert!(client.email.is_ascii());
        assert!(client.phone.starts_with("(11) 9"));
    }
}
