use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<polars::error::PolarsError> for PlannerError {
    fn from(err: polars::error::PolarsError) -> Self {
        PlannerError::Polars(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
