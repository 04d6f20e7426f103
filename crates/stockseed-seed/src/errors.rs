use thiserror::Error;

use stockseed_generate::GenerationError;

/// Errors raised while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("missing upstream data: {0}")]
    Precondition(String),
    #[error("remote call failed with status {status}: {body}")]
    RemoteCall { status: u16, body: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("generation error: {0}")]
    Generation(GenerationError),
    #[error("core error: {0}")]
    Core(#[from] stockseed_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<GenerationError> for SeedError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Precondition(message) => SeedError::Precondition(message),
            other => SeedError::Generation(other),
        }
    }
}

/// Result type for seed operations.
pub type SeedResult<T> = std::result::Result<T, SeedError>;
