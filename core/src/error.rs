use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Invalid input at record {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown dimension '{name}'")]
    UnknownDimension { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type InsightsResult<T> = Result<T, InsightsError>;
