use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic rng for one named unit of work within a seeded run.
pub fn keyed_rng(seed: u64, key: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, key))
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

pub(crate) fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn same_seed_and_key_repeat() {
        let a: u64 = keyed_rng(7, "products").random();
        let b: u64 = keyed_rng(7, "products").random();
        let c: u64 = keyed_rng(7, "clients").random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_currency(10.005_1), 10.01);
        assert_eq!(round_currency(3.0), 3.0);
    }
}
