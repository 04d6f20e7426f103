use rand::Rng;
use rand::seq::IndexedRandom;

use stockseed_core::CandidateClient;

const FIRST_NAMES: &[&str] = &[
    "João", "Maria", "José", "Ana", "Pedro", "Paula", "Lucas", "Julia", "Carlos", "Beatriz",
    "Rafael", "Mariana", "Gabriel", "Larissa", "Felipe", "Camila",
];

const LAST_NAMES: &[&str] = &[
    "Silva", "Santos", "Oliveira", "Souza", "Rodrigues", "Ferreira", "Alves", "Pereira", "Lima",
    "Gomes", "Ribeiro", "Carvalho", "Martins", "Rocha", "Dias", "Nunes",
];

const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "outlook.com",
    "hotmail.com",
    "empresa.com.br",
    "yahoo.com.br",
    "uol.com.br",
];

/// Builds candidate clients from fixed name pools.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientGenerator;

impl ClientGenerator {
    pub fn new() -> Self {
        Self
    }

    /// `count` clients; the iteration index keeps emails unique within a run.
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<CandidateClient> {
        (0..count).map(|index| self.build_client(index, rng)).collect()
    }

    fn build_client<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> CandidateClient {
        let first = pick(FIRST_NAMES, rng);
        let last = pick(LAST_NAMES, rng);
        let second_last = pick(LAST_NAMES, rng);

        let name = if last == second_last {
            format!("{first} {last}")
        } else {
            format!("{first} {last} {second_last}")
        };

        let email = format!(
            "{}.{}{index}@{}",
            email_local_part(first),
            email_local_part(last),
            pick(EMAIL_DOMAINS, rng)
        );
        let phone = format!(
            "(11) 9{}-{}",
            rng.random_range(7000..=9999),
            rng.random_range(1000..=9999)
        );
        let address = format!(
            "Rua {}, {} - Bairro {}",
            pick(LAST_NAMES, rng),
            rng.random_range(1..=2000),
            pick(FIRST_NAMES, rng)
        );

        CandidateClient {
            name,
            cpf_cnpj: generate_cpf(rng),
            email,
            phone,
            address,
        }
    }
}

/// Random CPF formatted as `ddd.ddd.ddd-dd`, with valid verifier digits.
pub fn generate_cpf<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits: Vec<u32> = (0..9).map(|_| rng.random_range(0..=9)).collect();
    for _ in 0..2 {
        digits.push(verifier_digit(&digits));
    }
    format_cpf(&digits)
}

/// Recompute both verifier digits from the first nine and compare.
pub fn verify_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|ch| ch.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }

    let mut expected = digits[..9].to_vec();
    for _ in 0..2 {
        expected.push(verifier_digit(&expected));
    }
    expected == digits
}

/// Weights run from `len + 1` down to 2; a remainder of 0 or 1 gives 0.
fn verifier_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, digit)| (weight_start - i as u32) * digit)
        .sum();
    let remainder = sum % 11;
    if remainder > 1 { 11 - remainder } else { 0 }
}

fn format_cpf(digits: &[u32]) -> String {
    let text: String = digits
        .iter()
        .filter_map(|digit| char::from_digit(*digit, 10))
        .collect();
    format!(
        "{}.{}.{}-{}",
        &text[0..3],
        &text[3..6],
        &text[6..9],
        &text[9..11]
    )
}

fn pick<'a, R: Rng + ?Sized>(values: &[&'a str], rng: &mut R) -> &'a str {
    values.choose(rng).copied().unwrap_or("Cliente")
}

fn email_local_part(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
