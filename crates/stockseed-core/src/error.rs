use thiserror::Error;

/// Core error type shared across stockseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown profile name, malformed override or other bad input.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A stage name outside the canonical pipeline.
    #[error("unknown seed stage: {0}")]
    UnknownStage(String),
}

/// Convenience alias for results returned by stockseed crates.
pub type Result<T> = std::result::Result<T, Error>;
