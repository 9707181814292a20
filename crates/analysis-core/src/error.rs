use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Ticker not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
