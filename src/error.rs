use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("observation {value} is outside the digit domain 0..{domain}")]
    OutOfDomain { value: i64, domain: usize },

    #[error("probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
