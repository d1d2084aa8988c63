use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO_FAILURE: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON_INVALID: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV_FAILURE: {0}")]
    Csv(#[from] csv::Error),
    #[error("API_ERROR: {0}")]
    Api(String),
    #[error("CONFIG_INVALID: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
